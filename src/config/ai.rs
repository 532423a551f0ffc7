//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Comma-separated Gemini API key pool, indexed by the client
    pub api_keys: Option<Secret<String>>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds; 0 disables the timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Let the model ground answers with web search
    #[serde(default = "default_enable_search")]
    pub enable_search: bool,
}

impl AiConfig {
    /// Get timeout as Duration, if one is set
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Check if a non-blank key pool is configured
    pub fn has_api_keys(&self) -> bool {
        self.api_keys
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate AI configuration
    ///
    /// A missing key pool is not an error: the server starts and every chat
    /// request reports the missing configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("ai.model"));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidBaseUrl);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_keys: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            enable_search: default_enable_search(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_enable_search() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout_secs, 120);
        assert!(config.enable_search);
        assert!(!config.has_api_keys());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));

        let config = AiConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_blank_key_pool_counts_as_missing() {
        let config = AiConfig {
            api_keys: Some(Secret::new("   ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_api_keys());
    }

    #[test]
    fn test_missing_keys_still_validate() {
        assert!(AiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let config = AiConfig {
            base_url: "generativelanguage.googleapis.com".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBaseUrl)));
    }

    #[test]
    fn test_keys_are_redacted_in_debug() {
        let config = AiConfig {
            api_keys: Some(Secret::new("AIza-secret".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("AIza-secret"));
    }
}
