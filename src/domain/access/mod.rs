//! Access module - subscription code validation.

mod grant;

pub use grant::{evaluate_access, AccessDecision, AccessGrant};
