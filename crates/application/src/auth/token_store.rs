//! In-memory credential storage.
//!
//! A thread-safe [`CredentialStore`] kept entirely in memory, used by
//! tests and by embedders that manage persistence themselves.

use std::collections::BTreeMap;
use std::sync::Arc;

use lifeos_domain::{CredentialKey, CredentialPair};
use parking_lot::RwLock;

use crate::ports::{CredentialStore, CredentialStoreError};

/// Thread-safe in-memory token store.
///
/// Clones share the same tokens.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    tokens: Arc<RwLock<BTreeMap<&'static str, String>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `pair`.
    #[must_use]
    pub fn with_pair(pair: &CredentialPair) -> Self {
        let store = Self::new();
        store.write_pair(pair);
        store
    }

    /// Get count of stored tokens.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tokens.read().len()
    }

    fn write_pair(&self, pair: &CredentialPair) {
        let mut tokens = self.tokens.write();
        tokens.insert(CredentialKey::Access.as_str(), pair.access.clone());
        tokens.insert(CredentialKey::Refresh.as_str(), pair.refresh.clone());
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: CredentialKey) -> Option<String> {
        self.tokens.read().get(key.as_str()).cloned()
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), CredentialStoreError> {
        self.tokens.write().insert(key.as_str(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: CredentialKey) -> Result<(), CredentialStoreError> {
        self.tokens.write().remove(key.as_str());
        Ok(())
    }

    fn replace_pair(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        self.write_pair(pair);
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        self.tokens.write().clear();
        Ok(())
    }

    fn pair(&self) -> Option<CredentialPair> {
        let tokens = self.tokens.read();
        Some(CredentialPair::new(
            tokens.get(CredentialKey::Access.as_str())?.clone(),
            tokens.get(CredentialKey::Refresh.as_str())?.clone(),
        ))
    }
}
