//! Credential store port
//!
//! A small key-value store for the access and refresh tokens.

use lifeos_domain::{CredentialKey, CredentialPair};

/// Errors that can occur while persisting credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No location to keep credentials in could be determined.
    #[error("could not determine credential directory")]
    NoConfigDir,
}

/// Port for token storage.
///
/// Reads are synchronous so attaching a credential never suspends.
/// `replace_pair` and `clear` must be atomic: a concurrent reader sees
/// either the old tokens or the new ones, never a mix.
pub trait CredentialStore: Send + Sync {
    /// Reads a token.
    fn get(&self, key: CredentialKey) -> Option<String>;

    /// Writes a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: CredentialKey, value: &str) -> Result<(), CredentialStoreError>;

    /// Removes a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: CredentialKey) -> Result<(), CredentialStoreError>;

    /// Replaces both tokens at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the pair cannot be persisted.
    fn replace_pair(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError>;

    /// Removes both tokens at once.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn clear(&self) -> Result<(), CredentialStoreError>;

    /// Both tokens, if both are stored.
    fn pair(&self) -> Option<CredentialPair> {
        Some(CredentialPair::new(
            self.get(CredentialKey::Access)?,
            self.get(CredentialKey::Refresh)?,
        ))
    }
}
