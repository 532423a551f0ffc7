//! Subscription access codes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::domain::foundation::Timestamp;

/// What an issued secret code unlocks and until when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    /// Last day of the subscription. Access ends at the start of this day (UTC).
    pub expiry_date: NaiveDate,
    pub reference_code: String,
}

impl AccessGrant {
    pub fn new(expiry_date: NaiveDate, reference_code: impl Into<String>) -> Self {
        Self {
            expiry_date,
            reference_code: reference_code.into(),
        }
    }

    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        now.is_after(&Timestamp::start_of_date(self.expiry_date))
    }

    /// Compares reference codes without leaking a timing signal.
    pub fn reference_matches(&self, candidate: &str) -> bool {
        self.reference_code
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into()
    }
}

/// Outcome of checking a code/reference pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    UnknownCode,
    Expired { expiry_date: NaiveDate },
    ReferenceMismatch,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, AccessDecision::Expired { .. })
    }

    /// User-facing message shown by the client.
    pub fn message(&self) -> String {
        match self {
            AccessDecision::Granted => "Successfully authenticated!".to_string(),
            AccessDecision::UnknownCode => "Please enter valid secret code".to_string(),
            AccessDecision::Expired { expiry_date } => format!(
                "Please renew your subscription. Your subscription expired on {}",
                expiry_date.format("%Y-%m-%d")
            ),
            AccessDecision::ReferenceMismatch => "Invalid Reference Code".to_string(),
        }
    }
}

/// Checks, in order: the code exists, it has not expired, the reference matches.
pub fn evaluate_access(
    grant: Option<&AccessGrant>,
    reference_code: &str,
    now: &Timestamp,
) -> AccessDecision {
    let Some(grant) = grant else {
        return AccessDecision::UnknownCode;
    };

    if grant.is_expired_at(now) {
        return AccessDecision::Expired {
            expiry_date: grant.expiry_date,
        };
    }

    if !grant.reference_matches(reference_code) {
        return AccessDecision::ReferenceMismatch;
    }

    AccessDecision::Granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn grant() -> AccessGrant {
        AccessGrant::new(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(), "REF-7")
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    #[test]
    fn valid_code_and_reference_is_granted() {
        let decision = evaluate_access(Some(&grant()), "REF-7", &at(2025, 6, 1, 0));
        assert!(decision.is_granted());
        assert_eq!(decision.message(), "Successfully authenticated!");
    }

    #[test]
    fn unknown_code_is_rejected() {
        let decision = evaluate_access(None, "REF-7", &at(2025, 6, 1, 0));
        assert_eq!(decision, AccessDecision::UnknownCode);
        assert_eq!(decision.message(), "Please enter valid secret code");
    }

    #[test]
    fn access_ends_at_start_of_expiry_day() {
        assert!(!evaluate_access(Some(&grant()), "REF-7", &at(2025, 12, 30, 23)).is_expired());

        let decision = evaluate_access(Some(&grant()), "REF-7", &at(2025, 12, 31, 1));
        assert!(decision.is_expired());
        assert_eq!(
            decision.message(),
            "Please renew your subscription. Your subscription expired on 2025-12-31"
        );
    }

    #[test]
    fn expiry_is_checked_before_reference() {
        let decision = evaluate_access(Some(&grant()), "WRONG", &at(2026, 1, 5, 0));
        assert!(decision.is_expired());
    }

    #[test]
    fn reference_mismatch_is_rejected() {
        let decision = evaluate_access(Some(&grant()), "REF-8", &at(2025, 6, 1, 0));
        assert_eq!(decision, AccessDecision::ReferenceMismatch);
        assert_eq!(decision.message(), "Invalid Reference Code");

        assert!(!grant().reference_matches("REF-77"));
    }

    #[test]
    fn grant_deserializes_client_shape() {
        let grant: AccessGrant = serde_json::from_str(
            r#"{"expiryDate":"2025-12-31","referenceCode":"REF-7"}"#,
        )
        .unwrap();
        assert_eq!(grant.reference_code, "REF-7");
    }
}
