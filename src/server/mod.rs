pub mod handlers;
mod page;
pub mod types;

use crate::{
    Result,
    analysis::{Analyzer, SessionPreference},
    config::Config,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::AppState;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/tasks", get(handlers::list_tasks))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).put(handlers::put_preferences),
        )
        .route("/api/generate", post(handlers::generate))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the UI and API until the process is stopped. The credential is
/// supplied by the caller; nothing here reads the environment.
pub async fn run(config: Config, api_key: String) -> Result<()> {
    let analyzer = Analyzer::from_config(&config.inference, api_key)?;
    let preference = SessionPreference::new(config.server.stream_by_default);
    let app = router(
        AppState::new(analyzer, preference),
        config.server.max_upload_bytes,
    );

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!(
        "Starting server on {} (model: {})",
        addr, config.inference.model
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
