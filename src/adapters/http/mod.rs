//! HTTP adapters - REST API implementations.
//!
//! Each feature has its own HTTP adapter; `app_router` mounts them all.

pub mod access;
pub mod chat;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

// Re-export key types for convenience
pub use access::{access_routes, AccessHandlers};
pub use chat::{chat_routes, ChatHandlers};

/// Builds the API router.
///
/// # Routes
/// - `POST /api/chat` - Stream a persona reply
/// - `POST /api/validate-code` - Check a subscription code
/// - `GET /health` - Liveness
pub fn app_router(chat: ChatHandlers, access: AccessHandlers) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/chat", chat_routes(chat))
        .nest("/api/validate-code", access_routes(access))
}

/// GET /health - Liveness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
