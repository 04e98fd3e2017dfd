use mvc_controller::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{InMemoryRepository, RepositoryState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging, builds the controllers and serves them.
#[tokio::main]
async fn main() {
    // 1. Configuration (.env first so it can feed AppConfig::load).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, otherwise verbose for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mvc_controller=debug,tower_http=info,axum=trace".into());

    // 3. Log format per environment.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    tracing::info!(
        views = %config.views_dir.display(),
        scoping = ?config.fallback_scoping,
        "views configured"
    );

    // 4. Storage and controllers.
    let repo = Arc::new(InMemoryRepository::new()) as RepositoryState;
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, repo));

    // 5. Serve.
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server terminated");
    }
}
