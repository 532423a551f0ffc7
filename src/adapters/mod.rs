//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Generative model providers and credential rotation
//! - `access` - Access code registries
//! - `http` - Axum routes, handlers and DTOs

pub mod access;
pub mod ai;
pub mod http;
