//! HTTP surface of FinWise: chat sessions, turns, document uploads, health.

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub use crate::core::app_state::{AppState, DEFAULT_MAX_UPLOAD_BYTES};
pub use crate::error_handler::{AppError, AppResult};

use crate::middleware_layer::json_extractor::json_error_mapper;
use crate::routes::{
    documents::upload_route::upload_documents,
    health_route::health,
    sessions::{
        message_route::post_message,
        session_routes::{close_session, create_session, get_session, list_sessions, select_session},
    },
};

pub fn router(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/{id}", get(get_session).delete(close_session))
        .route("/sessions/{id}/select", post(select_session))
        .route("/sessions/{id}/messages", post(post_message))
        .route(
            "/documents",
            post(upload_documents).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(middleware::from_fn(json_error_mapper))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

/// Serves the API on `addr` until Ctrl+C.
pub async fn start(state: AppState, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr).await.map_err(AppError::Bind)?;
    info!(%addr, "FinWise API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; stop the process externally");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests;
