//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port, plus the credential rotation
//! wrapper used by the chat endpoint.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `GeminiProvider` - Google Gemini models over SSE
//! - `KeyRotatingProvider` - Per-call key selection with quota failover signalling

mod gemini_provider;
mod mock_provider;
mod rotating_provider;

pub use gemini_provider::{GeminiConfig, GeminiProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use mock_provider::{MockAIProvider, MockCall, MockError, MockResponse, MockStreamSender};
pub use rotating_provider::{KeyRotatingProvider, RotationError};
