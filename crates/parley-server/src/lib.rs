//! HTTP surface for Parley.
//!
//! Exposes chat, session administration, and health endpoints over an
//! [`Orchestrator`](parley_core::Orchestrator) shared through [`AppState`].

mod error;
mod handlers;
mod state;
mod uptime;

pub use error::ApiError;
pub use state::AppState;
pub use uptime::format_uptime;

use axum::Router;
use axum::routing::{delete, get, post};
use log::info;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router over shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/chat/", post(handlers::chat))
        .route("/chat/session/{session_id}", delete(handlers::clear_session))
        .route("/chat/stats", get(handlers::memory_stats))
        .route("/admin/status", get(handlers::admin_status))
        .route("/admin/sessions", delete(handlers::clear_all_sessions))
        .route("/admin/test-chat", post(handlers::test_chat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("http server listening (addr={addr})");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("http server stopped");
    Ok(())
}
