//! Access code registry port.
//!
//! Looks up the grant behind a subscription secret code. The validation rules
//! themselves live in `domain::access`; this port only answers "what does
//! this code unlock".

use async_trait::async_trait;

use crate::domain::access::AccessGrant;
use crate::domain::foundation::DomainError;

/// Port for looking up issued access codes.
#[async_trait]
pub trait AccessCodeRegistry: Send + Sync {
    /// Returns the grant for `code`, or `None` if no such code was issued.
    ///
    /// # Errors
    ///
    /// `DomainError` when the backing store cannot be read.
    async fn find(&self, code: &str) -> Result<Option<AccessGrant>, DomainError>;
}
