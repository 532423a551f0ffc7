//! Persona prompt configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Largest offset any real time zone uses, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Settings for compiling persona instructions
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaConfig {
    /// Offset of the clock shown to the model (IST by default)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

impl PersonaConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset(self.utc_offset_minutes));
        }
        Ok(())
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset(),
        }
    }
}

fn default_utc_offset() -> i32 {
    330
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_india_standard_time() {
        assert_eq!(PersonaConfig::default().utc_offset_minutes, 330);
    }

    #[test]
    fn accepts_real_offsets() {
        for offset in [-720, -300, 0, 345, 840] {
            let config = PersonaConfig {
                utc_offset_minutes: offset,
            };
            assert!(config.validate().is_ok(), "offset {offset}");
        }
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        let config = PersonaConfig {
            utc_offset_minutes: 900,
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidUtcOffset(900))
        ));
    }
}
