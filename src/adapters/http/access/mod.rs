//! HTTP adapter for subscription access codes.

mod dto;
mod handlers;
mod routes;

pub use dto::{ValidateCodeRequest, ValidateCodeResponse, MISSING_CODES_MESSAGE};
pub use handlers::AccessHandlers;
pub use routes::access_routes;
