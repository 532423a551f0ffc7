//! Persona Chat - streaming chat with configurable AI characters
//!
//! This crate compiles each character's persona into a system instruction,
//! relays the model's reply as it streams, and lets the client rotate
//! through a pool of API keys when one runs out of quota.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
