//! Credentials module - provider API key pool and selection.

mod pool;

pub use pool::{select_credential, ApiCredential, CredentialError, CredentialPool};
