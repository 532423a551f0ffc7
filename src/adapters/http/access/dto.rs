//! HTTP DTOs for access code validation.

use serde::{Deserialize, Serialize};

use crate::domain::access::AccessDecision;

/// Message returned when either code is absent.
pub const MISSING_CODES_MESSAGE: &str = "Secret code and Reference code are required.";

/// Request body for `POST /api/validate-code`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCodeRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub ref_code: Option<String>,
}

/// Outcome of a validation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateCodeResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
}

impl ValidateCodeResponse {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            expired: None,
        }
    }
}

impl From<&AccessDecision> for ValidateCodeResponse {
    fn from(decision: &AccessDecision) -> Self {
        Self {
            valid: decision.is_granted(),
            message: decision.message(),
            expired: decision.is_expired().then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn request_accepts_missing_fields() {
        let req: ValidateCodeRequest = serde_json::from_value(json!({ "code": "GOLD" })).unwrap();
        assert_eq!(req.code.as_deref(), Some("GOLD"));
        assert!(req.ref_code.is_none());
    }

    #[test]
    fn expired_response_sets_the_flag() {
        let decision = AccessDecision::Expired {
            expiry_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        };
        let body = serde_json::to_value(ValidateCodeResponse::from(&decision)).unwrap();

        assert_eq!(body["valid"], false);
        assert_eq!(body["expired"], true);
        assert!(body["message"].as_str().unwrap().ends_with("2025-03-31"));
    }

    #[test]
    fn other_responses_omit_expired() {
        let body = serde_json::to_value(ValidateCodeResponse::from(&AccessDecision::Granted)).unwrap();

        assert_eq!(body, json!({ "valid": true, "message": "Successfully authenticated!" }));
    }
}
