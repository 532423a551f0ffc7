//! AI Provider Port - Interface for the generative-text provider.
//!
//! This port abstracts the streaming call to the hosted model, so the chat
//! handler can compile instructions and relay output without coupling to a
//! specific vendor API.
//!
//! # Design
//!
//! - Streaming only; the chat endpoint never waits for a full completion
//! - The credential is passed per call, since the client chooses the key slot
//! - Provider-agnostic message format
//! - Error types for the failure modes the rotation layer must tell apart
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl AIProvider for EchoProvider {
//!     async fn stream_complete(
//!         &self,
//!         _credential: &ApiCredential,
//!         request: CompletionRequest,
//!     ) -> Result<ChatStream, AIError> {
//!         let text = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
//!         Ok(Box::pin(futures::stream::iter(vec![Ok(StreamChunk::content(text))])))
//!     }
//!     // ... provider_info
//! }
//! ```

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::credentials::ApiCredential;

/// Stream of output fragments, in provider order.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AIError>> + Send>>;

/// Port for generative-model interactions.
///
/// Implementations perform exactly one outbound call per invocation and never
/// retry on their own; retry policy belongs to the caller.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Starts a streaming generation authenticated with `credential`.
    ///
    /// Errors detected before the first byte (bad status, refused connection)
    /// are returned directly; later failures arrive as stream items.
    async fn stream_complete(
        &self,
        credential: &ApiCredential,
        request: CompletionRequest,
    ) -> Result<ChatStream, AIError>;

    /// Get provider information (name, model, capabilities).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a streamed generation.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Prior turns plus the new user message, oldest first.
    pub messages: Vec<Message>,
    /// Compiled system instruction.
    pub system_prompt: Option<String>,
    /// Whether the provider may ground answers with web search.
    pub enable_search: bool,
    /// Request metadata for tracing.
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            enable_search: false,
            metadata,
        }
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_search(mut self, enabled: bool) -> Self {
        self.enable_search = enabled;
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Role of the message sender. Model turns use the provider's `model` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "model", alias = "assistant")]
    Assistant,
}

/// Request metadata for tracing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Trace ID for log correlation.
    pub trace_id: String,
    /// `single` or `group`.
    pub chat_type: &'static str,
}

impl RequestMetadata {
    pub fn new(trace_id: impl Into<String>, chat_type: &'static str) -> Self {
        Self {
            trace_id: trace_id.into(),
            chat_type,
        }
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit the output token limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
    /// Any other terminal reason.
    Other,
}

/// Streaming chunk from the provider.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    /// New text in this chunk; may be empty on the final chunk.
    pub delta: String,
    /// If present, generation is complete.
    pub finish_reason: Option<FinishReason>,
    /// Token usage (only present on the final chunk).
    pub usage: Option<TokenUsage>,
}

impl StreamChunk {
    pub fn content(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            finish_reason: None,
            usage: None,
        }
    }

    pub fn final_chunk(finish_reason: FinishReason, usage: Option<TokenUsage>) -> Self {
        Self {
            delta: String::new(),
            finish_reason: Some(finish_reason),
            usage,
        }
    }

    pub fn is_final(&self) -> bool {
        self.finish_reason.is_some()
    }
}

/// Provider information and capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "gemini").
    pub name: String,
    /// Model identifier (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Whether the provider can ground answers with web search.
    pub supports_search: bool,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            supports_search: false,
        }
    }

    pub fn with_search(mut self, supports: bool) -> Self {
        self.supports_search = supports;
        self
    }
}

/// AI provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    /// Quota or rate limit hit on the credential used (HTTP 429).
    #[error("rate limited (429): {message}")]
    RateLimited { message: String },

    /// Content was blocked for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider rejected the request as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl AIError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// True when the failure means the credential's quota is spent.
    ///
    /// Besides the structured variant, any error whose text carries `429` is
    /// treated the same, since some failures only surface the status inside a
    /// message.
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, AIError::RateLimited { .. }) || self.to_string().contains("429")
    }
}
