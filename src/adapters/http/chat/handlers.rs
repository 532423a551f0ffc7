//! HTTP handlers for the chat endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::chat::{StreamChatError, StreamChatHandler};

use super::dto::{ChatRequest, ErrorResponse, MISSING_PARAMETERS_MESSAGE};

/// Header carrying the per-request trace id.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ChatHandlers {
    stream_handler: Arc<StreamChatHandler>,
}

impl ChatHandlers {
    pub fn new(stream_handler: Arc<StreamChatHandler>) -> Self {
        Self { stream_handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/chat - Stream one persona reply as plain text
pub async fn stream_chat(
    State(handlers): State<ChatHandlers>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected chat request body");
            return handle_chat_error(StreamChatError::RequestMalformed(
                MISSING_PARAMETERS_MESSAGE.to_string(),
            ));
        }
    };

    let cmd = match request.into_command() {
        Ok(cmd) => cmd,
        Err(e) => return handle_chat_error(e),
    };

    match handlers.stream_handler.handle(cmd).await {
        Ok(result) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (header::HeaderName::from_static(TRACE_ID_HEADER), result.trace_id),
            ],
            Body::from_stream(result.stream),
        )
            .into_response(),
        Err(e) => handle_chat_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_chat_error(error: StreamChatError) -> Response {
    let status = match &error {
        StreamChatError::RequestMalformed(_)
        | StreamChatError::InvalidCredentialIndex { .. }
        | StreamChatError::NegativeCredentialIndex(_) => StatusCode::BAD_REQUEST,
        StreamChatError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        StreamChatError::ConfigurationMissing | StreamChatError::ProviderUnavailable(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(ErrorResponse::from(&error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses_follow_the_failure_kind() {
        let cases = [
            (StreamChatError::RequestMalformed("x".into()), StatusCode::BAD_REQUEST),
            (
                StreamChatError::InvalidCredentialIndex {
                    index: 3,
                    pool_size: 3,
                },
                StatusCode::BAD_REQUEST,
            ),
            (StreamChatError::NegativeCredentialIndex(-1), StatusCode::BAD_REQUEST),
            (
                StreamChatError::QuotaExceeded { failed_index: 0 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                StreamChatError::ConfigurationMissing,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StreamChatError::ProviderUnavailable("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(handle_chat_error(error).status(), status);
        }
    }
}
