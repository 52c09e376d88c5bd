//! HTTP and WebSocket transport.
//!
//! Endpoints:
//! - `GET  /`: chat page
//! - `POST /chat`: one turn, JSON in and out
//! - `GET  /ws`: WebSocket, one turn per text frame
//! - `GET  /health`: knowledge and credential checks

mod chat;
mod health;
mod ws;

pub use chat::{ChatRequest, ChatResponse, ErrorResponse};
pub use health::{HealthCheck, HealthResponse};

use crate::concierge::Concierge;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

#[derive(Clone)]
pub struct AppState {
    concierge: Arc<Concierge>,
}

pub fn router(concierge: Arc<Concierge>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chat", post(chat::chat))
        .route("/ws", get(ws::upgrade))
        .route("/health", get(health::health))
        .with_state(AppState { concierge })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Bind and serve until the process receives ctrl-c.
pub async fn serve(bind_address: &str, concierge: Arc<Concierge>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!(bind_address = %bind_address, "Starting Wine Concierge server");

    axum::serve(listener, router(concierge))
        .with_graceful_shutdown(async {
            // A failed signal handler means no graceful shutdown, not a crash
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}
