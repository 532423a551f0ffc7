//! Foundation module - Shared domain primitives.
//!
//! Error vocabulary and the timestamp value object used across the
//! persona, credential and access modules.

mod errors;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use timestamp::Timestamp;
