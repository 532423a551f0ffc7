//! HTTP handlers for access code validation.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::access::{ValidateAccessCodeCommand, ValidateAccessCodeHandler};

use super::dto::{ValidateCodeRequest, ValidateCodeResponse, MISSING_CODES_MESSAGE};

#[derive(Clone)]
pub struct AccessHandlers {
    validate_handler: Arc<ValidateAccessCodeHandler>,
}

impl AccessHandlers {
    pub fn new(validate_handler: Arc<ValidateAccessCodeHandler>) -> Self {
        Self { validate_handler }
    }
}

/// POST /api/validate-code - Check a secret code against its reference code
pub async fn validate_code(
    State(handlers): State<AccessHandlers>,
    payload: Result<Json<ValidateCodeRequest>, JsonRejection>,
) -> Response {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let cmd = match ValidateAccessCodeCommand::new(request.code, request.ref_code) {
        Ok(cmd) => cmd,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ValidateCodeResponse::invalid(MISSING_CODES_MESSAGE)),
            )
                .into_response()
        }
    };

    match handlers.validate_handler.handle(cmd).await {
        Ok(decision) => (StatusCode::OK, Json(ValidateCodeResponse::from(&decision))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Access code lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ValidateCodeResponse::invalid("Internal server error")),
            )
                .into_response()
        }
    }
}
