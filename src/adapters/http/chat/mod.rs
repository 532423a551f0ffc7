//! HTTP adapter for the streaming chat endpoint.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ChatRequest, ChatType, ErrorResponse, HistoryEntry, HistoryPart, MISSING_PARAMETERS_MESSAGE,
};
pub use handlers::{ChatHandlers, TRACE_ID_HEADER};
pub use routes::chat_routes;
