//! Key Rotating Provider - credential selection and quota failover around one provider call.
//!
//! The client owns the rotation index. Each call selects the credential at
//! that index from the configured pool, performs exactly one provider call,
//! and turns a quota failure into `QuotaExceeded { failed_index }` so the
//! client can advance to the next key and resend. Nothing is retried here.
//!
//! # Example
//!
//! ```ignore
//! let provider: Arc<dyn AIProvider> = Arc::new(GeminiProvider::new(config)?);
//! let rotating = KeyRotatingProvider::new(provider, Some(Secret::new("k0,k1".into())));
//!
//! match rotating.invoke(1, request).await {
//!     Err(RotationError::QuotaExceeded { failed_index }) => { /* client moves to failed_index + 1 */ }
//!     other => { /* ... */ }
//! }
//! ```

use futures::stream::{self, StreamExt};
use secrecy::Secret;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::credentials::{select_credential, CredentialError};
use crate::ports::{AIError, AIProvider, ChatStream, CompletionRequest};

/// Failures of a rotated provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotationError {
    #[error("API key configuration is missing")]
    ConfigurationMissing,

    #[error("Invalid API key index {index} (pool has {pool_size} keys)")]
    InvalidCredentialIndex { index: usize, pool_size: usize },

    /// The key at `failed_index` has no quota left.
    #[error("Quota exceeded for API key {failed_index}")]
    QuotaExceeded { failed_index: usize },

    #[error("AI provider failed: {0}")]
    ProviderUnavailable(String),
}

impl From<CredentialError> for RotationError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::ConfigurationMissing => RotationError::ConfigurationMissing,
            CredentialError::InvalidCredentialIndex { index, pool_size } => {
                RotationError::InvalidCredentialIndex { index, pool_size }
            }
        }
    }
}

/// Wraps a provider with per-call credential selection.
pub struct KeyRotatingProvider {
    provider: Arc<dyn AIProvider>,
    raw_keys: Option<Secret<String>>,
}

impl KeyRotatingProvider {
    /// `raw_keys` is the comma-separated pool exactly as configured.
    pub fn new(provider: Arc<dyn AIProvider>, raw_keys: Option<Secret<String>>) -> Self {
        Self { provider, raw_keys }
    }

    /// Calls the provider with the key at `key_index`.
    ///
    /// The pool is reparsed on every call. The first stream item is awaited
    /// before returning, so a quota failure reported as the first stream
    /// event still comes back as `QuotaExceeded` instead of a broken body.
    ///
    /// # Errors
    ///
    /// - `ConfigurationMissing` / `InvalidCredentialIndex` before any provider call
    /// - `QuotaExceeded { failed_index: key_index }` on a rate-limit failure
    /// - `ProviderUnavailable` on any other provider failure
    pub async fn invoke(
        &self,
        key_index: usize,
        request: CompletionRequest,
    ) -> Result<ChatStream, RotationError> {
        let credential = select_credential(self.raw_keys.as_ref(), key_index)?;

        let mut upstream = self
            .provider
            .stream_complete(&credential, request)
            .await
            .map_err(|err| translate(key_index, err))?;

        match upstream.next().await {
            Some(Ok(first)) => Ok(Box::pin(stream::once(async move { Ok(first) }).chain(upstream))),
            Some(Err(err)) => Err(translate(key_index, err)),
            None => Ok(Box::pin(stream::empty())),
        }
    }
}

fn translate(key_index: usize, err: AIError) -> RotationError {
    if err.is_quota_exhausted() {
        tracing::warn!(key_index, error = %err, "API key quota exhausted");
        RotationError::QuotaExceeded {
            failed_index: key_index,
        }
    } else {
        tracing::error!(key_index, error = %err, "AI provider call failed");
        RotationError::ProviderUnavailable(err.to_string())
    }
}
