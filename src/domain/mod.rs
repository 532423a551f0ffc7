//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, errors)
//! - `persona` - Characters, expertise, and the instruction compiler
//! - `credentials` - The API key pool and index selection
//! - `access` - Subscription access codes

pub mod access;
pub mod credentials;
pub mod foundation;
pub mod persona;
