//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PERSONA_CHAT` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use persona_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod access;
mod ai;
mod error;
mod persona;
mod server;

pub use access::AccessConfig;
pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use persona::PersonaConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment still loads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini configuration and the API key pool
    #[serde(default)]
    pub ai: AiConfig,

    /// Instruction compiler settings
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Subscription access codes
    #[serde(default)]
    pub access: AccessConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PERSONA_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PERSONA_CHAT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PERSONA_CHAT__AI__API_KEYS=k0,k1,k2` -> `ai.api_keys = "k0,k1,k2"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PERSONA_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.persona.validate()?;
        self.access.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "PERSONA_CHAT__SERVER__PORT",
        "PERSONA_CHAT__SERVER__ENVIRONMENT",
        "PERSONA_CHAT__AI__API_KEYS",
        "PERSONA_CHAT__AI__ENABLE_SEARCH",
        "PERSONA_CHAT__PERSONA__UTC_OFFSET_MINUTES",
        "PERSONA_CHAT__ACCESS__CODES_JSON",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.persona.utc_offset_minutes, 330);
        assert!(config.ai.api_keys.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_key_pool_is_read_verbatim() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PERSONA_CHAT__AI__API_KEYS", "k0, k1,k2");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.ai.api_keys.as_ref().unwrap().expose_secret(),
            "k0, k1,k2"
        );
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PERSONA_CHAT__SERVER__PORT", "3000");
        env::set_var("PERSONA_CHAT__AI__ENABLE_SEARCH", "false");
        env::set_var("PERSONA_CHAT__PERSONA__UTC_OFFSET_MINUTES", "-300");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(!config.ai.enable_search);
        assert_eq!(config.persona.utc_offset_minutes, -300);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PERSONA_CHAT__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_validate_rejects_bad_access_codes() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PERSONA_CHAT__ACCESS__CODES_JSON", "not json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidAccessCodes(_))
        ));
    }
}
