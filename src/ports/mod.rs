//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - streaming generation against the hosted model
//! - `AccessCodeRegistry` - lookup of issued subscription codes

mod access_code_registry;
mod ai_provider;

pub use access_code_registry::AccessCodeRegistry;
pub use ai_provider::{
    AIError, AIProvider, ChatStream, CompletionRequest, FinishReason, Message, MessageRole,
    ProviderInfo, RequestMetadata, StreamChunk, TokenUsage,
};
