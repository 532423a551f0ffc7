//! ValidateAccessCodeHandler - checks a subscription secret code and its reference code.

use std::sync::Arc;

use crate::domain::access::{evaluate_access, AccessDecision};
use crate::domain::foundation::{DomainError, Timestamp, ValidationError};
use crate::ports::AccessCodeRegistry;

/// Command to validate a code pair.
#[derive(Debug, Clone)]
pub struct ValidateAccessCodeCommand {
    pub code: String,
    pub reference_code: String,
}

impl ValidateAccessCodeCommand {
    /// Both codes must be present and non-blank.
    pub fn new(
        code: Option<String>,
        reference_code: Option<String>,
    ) -> Result<Self, ValidationError> {
        let code = code
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ValidationError::empty_field("code"))?;
        let reference_code = reference_code
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ValidationError::empty_field("refCode"))?;

        Ok(Self {
            code,
            reference_code,
        })
    }
}

/// Handler for access code validation.
pub struct ValidateAccessCodeHandler {
    registry: Arc<dyn AccessCodeRegistry>,
}

impl ValidateAccessCodeHandler {
    pub fn new(registry: Arc<dyn AccessCodeRegistry>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, cmd: ValidateAccessCodeCommand) -> Result<AccessDecision, DomainError> {
        self.handle_at(cmd, &Timestamp::now()).await
    }

    /// Validates against an explicit clock.
    pub async fn handle_at(
        &self,
        cmd: ValidateAccessCodeCommand,
        now: &Timestamp,
    ) -> Result<AccessDecision, DomainError> {
        let grant = self.registry.find(&cmd.code).await?;
        let decision = evaluate_access(grant.as_ref(), &cmd.reference_code, now);

        if decision.is_granted() {
            tracing::info!("Access code accepted");
        } else {
            tracing::info!(reason = ?decision, "Access code rejected");
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::access::InMemoryAccessCodeRegistry;
    use crate::domain::access::AccessGrant;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn handler() -> ValidateAccessCodeHandler {
        let registry = InMemoryAccessCodeRegistry::new().with_grant(
            "GOLD",
            AccessGrant::new(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(), "REF-7"),
        );
        ValidateAccessCodeHandler::new(Arc::new(registry))
    }

    fn june() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
    }

    fn cmd(code: &str, reference: &str) -> ValidateAccessCodeCommand {
        ValidateAccessCodeCommand::new(Some(code.into()), Some(reference.into())).unwrap()
    }

    #[test]
    fn command_requires_both_codes() {
        assert!(ValidateAccessCodeCommand::new(None, Some("R".into())).is_err());
        assert!(ValidateAccessCodeCommand::new(Some("C".into()), Some(" ".into())).is_err());
    }

    #[tokio::test]
    async fn accepts_matching_pair() {
        let decision = handler().handle_at(cmd("GOLD", "REF-7"), &june()).await.unwrap();
        assert!(decision.is_granted());
    }

    #[tokio::test]
    async fn rejects_unknown_code() {
        let decision = handler().handle_at(cmd("SILVER", "REF-7"), &june()).await.unwrap();
        assert_eq!(decision, AccessDecision::UnknownCode);
    }

    #[tokio::test]
    async fn rejects_wrong_reference() {
        let decision = handler().handle_at(cmd("GOLD", "REF-0"), &june()).await.unwrap();
        assert_eq!(decision, AccessDecision::ReferenceMismatch);
    }

    #[tokio::test]
    async fn reports_expiry() {
        let later = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        let decision = handler().handle_at(cmd("GOLD", "REF-7"), &later).await.unwrap();
        assert!(decision.is_expired());
    }
}
