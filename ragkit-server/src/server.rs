//! Router assembly and server startup.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{delete, get, post},
};
use ragkit_core::RagService;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::routes;
use crate::settings::Settings;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RagService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/documents", post(routes::upload_document).get(routes::list_documents))
        .route("/api/v1/documents/{filename}", delete(routes::delete_document))
        .route("/api/v1/chat", post(routes::chat))
        .route("/api/v1/store/stats", get(routes::store_stats))
        .route("/api/v1/search", get(routes::search))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(service: Arc<RagService>, settings: Settings) -> anyhow::Result<()> {
    let app = app_router(AppState { service });
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| "invalid host/port for ragkit-server")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("ragkit-server listening on http://{}", addr);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
