//! Credential pool parsed from the comma-separated key configuration.

use secrecy::{ExposeSecret, Secret};
use std::fmt;
use thiserror::Error;

/// Errors raised while selecting a credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No credential pool is configured.
    #[error("API key configuration is missing")]
    ConfigurationMissing,

    /// The caller asked for a slot past the end of the pool.
    #[error("Invalid API key index {index} (pool has {pool_size} keys)")]
    InvalidCredentialIndex { index: usize, pool_size: usize },
}

/// One provider API key. Never printed.
#[derive(Clone)]
pub struct ApiCredential(Secret<String>);

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Secret::new(key.into()))
    }

    /// Raw key for the outbound request header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential([REDACTED])")
    }
}

/// Ordered list of credentials.
///
/// Entries are trimmed but otherwise kept as written, so slot `i` always
/// refers to the `i`-th comma-separated entry the operator configured. The
/// client owns the rotation index; the pool holds no cursor.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    credentials: Vec<ApiCredential>,
}

impl CredentialPool {
    /// Splits `raw` on commas and trims each entry.
    ///
    /// # Errors
    ///
    /// `ConfigurationMissing` when `raw` is empty or only whitespace.
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        if raw.trim().is_empty() {
            return Err(CredentialError::ConfigurationMissing);
        }

        let credentials = raw
            .split(',')
            .map(|entry| ApiCredential::new(entry.trim()))
            .collect();

        Ok(Self { credentials })
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// The credential at `index`.
    pub fn select(&self, index: usize) -> Result<&ApiCredential, CredentialError> {
        self.credentials
            .get(index)
            .ok_or(CredentialError::InvalidCredentialIndex {
                index,
                pool_size: self.credentials.len(),
            })
    }
}

/// Parses the configured pool and picks slot `index`.
///
/// An absent configuration is reported as `ConfigurationMissing` rather than
/// a panic so callers can answer with a structured error.
pub fn select_credential(
    raw: Option<&Secret<String>>,
    index: usize,
) -> Result<ApiCredential, CredentialError> {
    let raw = raw.ok_or(CredentialError::ConfigurationMissing)?;
    let pool = CredentialPool::parse(raw.expose_secret())?;
    pool.select(index).cloned()
}
