//! HTTP routes for access code validation.

use axum::{routing::post, Router};

use super::handlers::{validate_code, AccessHandlers};

/// Creates the access router. Mount at `/api/validate-code`.
pub fn access_routes(handlers: AccessHandlers) -> Router {
    Router::new()
        .route("/", post(validate_code))
        .with_state(handlers)
}
