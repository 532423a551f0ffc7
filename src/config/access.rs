//! Subscription access code configuration

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::ValidationError;

/// Access code settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    /// JSON object mapping each secret code to `{expiryDate, referenceCode}`
    pub codes_json: Option<String>,
}

impl AccessConfig {
    /// Checks that the codes, when set, are a JSON object.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(json) = &self.codes_json {
            serde_json::from_str::<Map<String, Value>>(json)
                .map_err(|e| ValidationError::InvalidAccessCodes(e.to_string()))?;
        }
        Ok(())
    }
}
