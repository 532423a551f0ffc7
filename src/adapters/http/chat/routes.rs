//! HTTP routes for the chat endpoint.

use axum::{routing::post, Router};

use super::handlers::{stream_chat, ChatHandlers};

/// Creates the chat router. Mount at `/api/chat`.
///
/// Only `POST` is routed, so other methods get `405 Method Not Allowed`.
pub fn chat_routes(handlers: ChatHandlers) -> Router {
    Router::new()
        .route("/", post(stream_chat))
        .with_state(handlers)
}
