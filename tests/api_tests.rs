use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use mvc_controller::{
    AppConfig, AppState, FallbackScoping, create_router,
    http::BODY_LIMIT,
    repository::{InMemoryRepository, Repository, RepositoryState},
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower::util::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        views_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/views")),
        ..AppConfig::default()
    }
}

fn seeded_repo() -> RepositoryState {
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    repo.create(vec![
        ("name".to_string(), "Saulius".to_string()),
        ("surname".to_string(), "Grigaitis".to_string()),
    ]);
    repo
}

fn app(repo: RepositoryState) -> axum::Router {
    create_router(AppState::new(test_config(), repo))
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let response = app(seeded_repo())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_index_negotiates_html_and_json() {
    let html = app(seeded_repo())
        .oneshot(
            Request::builder()
                .uri("/records")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(html.status(), StatusCode::OK);
    assert_eq!(body_text(html).await, "Saulius\n");

    let json = app(seeded_repo())
        .oneshot(
            Request::builder()
                .uri("/records")
                .header(header::ACCEPT, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        json.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );
    let body: serde_json::Value = serde_json::from_str(&body_text(json).await).unwrap();
    assert_eq!(body["records"][0]["surname"], "Grigaitis");
}

#[tokio::test]
async fn test_show_uses_path_parameter() {
    let response = app(seeded_repo())
        .oneshot(
            Request::builder()
                .uri("/records/1")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "Saulius\n");
}

#[tokio::test]
async fn test_show_missing_record_is_not_found() {
    let response = app(seeded_repo())
        .oneshot(
            Request::builder()
                .uri("/records/99")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_new_route_wins_over_path_parameter() {
    let response = app(seeded_repo())
        .oneshot(
            Request::builder()
                .uri("/records/new")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "header\n\nnew\nfooter\n");
}

#[tokio::test]
async fn test_form_post_creates_record_and_redirects() {
    let repo = seeded_repo();

    let response = app(repo.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/records")
                .header(header::ACCEPT, "text/html")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=James&surname=Bond"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/records/2");
    let record = repo.find(2).unwrap();
    assert_eq!(record.get("name"), Some("James"));
    assert_eq!(record.get("surname"), Some("Bond"));
}

#[tokio::test]
async fn test_update_merges_query_parameters() {
    let repo = seeded_repo();

    let response = app(repo.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/records/1?surname=Bond")
                .header(header::ACCEPT, "text/html")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/records/1");
    let record = repo.find(1).unwrap();
    assert_eq!(record.get("name"), Some("Saulius"));
    assert_eq!(record.get("surname"), Some("Bond"));
}

#[tokio::test]
async fn test_oversized_body_is_bad_request() {
    let repo = seeded_repo();

    let response = app(repo.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/records")
                .header(header::ACCEPT, "text/html")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(vec![b'a'; BODY_LIMIT + 1]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Bad Request");
    assert_eq!(repo.all().len(), 1);
}

#[test]
fn test_scoped_configuration_reaches_controller() {
    let config = AppConfig {
        fallback_scoping: FallbackScoping::Scoped,
        ..test_config()
    };

    let state = AppState::new(config, seeded_repo());

    assert_eq!(state.records.fallback_scoping(), FallbackScoping::Scoped);
}

#[tokio::test]
async fn test_served_over_tcp() {
    let router = app(seeded_repo());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/records", address))
        .header("Accept", "application/json")
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["records"][0]["name"], "Saulius");
}
