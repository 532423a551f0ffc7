//! In-memory access code registry.
//!
//! Codes are loaded once from configuration as a JSON object mapping each
//! secret code to its grant:
//!
//! ```json
//! { "SECRET1": { "expiryDate": "2025-12-31", "referenceCode": "REF-7" } }
//! ```

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::access::AccessGrant;
use crate::domain::foundation::{DomainError, ValidationError};
use crate::ports::AccessCodeRegistry;

/// Registry backed by a map loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccessCodeRegistry {
    grants: HashMap<String, AccessGrant>,
}

impl InMemoryAccessCodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the configured JSON object.
    ///
    /// # Errors
    ///
    /// `ValidationError::InvalidFormat` if `json` is not an object of grants.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let grants: HashMap<String, AccessGrant> = serde_json::from_str(json)
            .map_err(|e| ValidationError::invalid_format("access.codes_json", e.to_string()))?;
        Ok(Self { grants })
    }

    pub fn with_grant(mut self, code: impl Into<String>, grant: AccessGrant) -> Self {
        self.grants.insert(code.into(), grant);
        self
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[async_trait]
impl AccessCodeRegistry for InMemoryAccessCodeRegistry {
    async fn find(&self, code: &str) -> Result<Option<AccessGrant>, DomainError> {
        Ok(self.grants.get(code).cloned())
    }
}
