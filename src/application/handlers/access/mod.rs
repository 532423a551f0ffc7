//! Access code handlers.

mod validate_access_code;

pub use validate_access_code::{ValidateAccessCodeCommand, ValidateAccessCodeHandler};
