use std::sync::Arc;

use axum::{Router, http::HeaderName, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Controller core: registries, filter pipeline, dispatch.
pub mod controller;
pub mod http;
pub mod negotiate;
pub mod view;
pub mod error;
pub mod config;

// Reference application built on the core.
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use controller::{
    Controller, FallbackScoping, Filter, FilterOptions, FilterProvider, FilterProviderState,
    Handler,
};
pub use http::{Request, Response};
pub use negotiate::{MimeTypes, Responders, respond_to, respond_to_with};
pub use repository::{InMemoryRepository, Repository, RepositoryState};
pub use view::{
    HtmlRenderable, JsonRenderable, MiniJinjaEngine, Renderer, SerdeJsonEngine, ViewContext,
    redirect_to,
};

/// AppState
///
/// Everything the router needs, assembled once at startup. Controllers are
/// finished (setup hook run) before they land here and are only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// The records controller mounted under `/records`.
    pub records: Arc<Controller>,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Builds the renderer from `config` and wires the controllers to `repo`.
    pub fn new(config: AppConfig, repo: RepositoryState) -> Self {
        let renderer = Renderer::new(
            Arc::new(MiniJinjaEngine::from_directory(&config.views_dir)),
            Arc::new(SerdeJsonEngine {
                pretty: config.pretty_json,
            }),
        );

        let application = Arc::new(handlers::application_controller());
        let records = Arc::new(handlers::records_controller(
            repo,
            renderer,
            Some(application as FilterProviderState),
            config.fallback_scoping,
        ));

        Self { records, config }
    }
}

/// create_router
///
/// Mounts the controllers and wraps them in the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(routes::records::records_routes(state.records.clone()));

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set above so
/// every log line of a dispatch (filters included) can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
