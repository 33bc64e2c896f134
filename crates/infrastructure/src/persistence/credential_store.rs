//! File-backed credential store.
//!
//! Stores the token pair in the platform-specific config directory:
//! - Linux: ~/.config/lifeos/credentials.json
//! - macOS: ~/Library/Application Support/lifeos/credentials.json
//! - Windows: %APPDATA%/lifeos/credentials.json

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lifeos_application::ports::{CredentialStore, CredentialStoreError};
use lifeos_domain::{CredentialKey, CredentialPair};
use parking_lot::RwLock;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::block_in_place;
use tracing::debug;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

type Tokens = BTreeMap<String, String>;

/// Credential store persisted as a small JSON object.
///
/// The file is read once when the store is opened; reads are then served
/// from memory. Every write replaces the file through a temporary file
/// and a rename while the write lock is held, so the file and the cache
/// never disagree and a reader never sees half of a pair.
///
/// Writes are synchronous because the [`CredentialStore`] port is. Called
/// from a multi-thread tokio runtime, the file I/O runs through
/// [`block_in_place`] so other tasks move off the worker; on a
/// current-thread runtime it runs inline and stalls that runtime for the
/// duration of one small write.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    tokens: RwLock<Tokens>,
}

impl FileCredentialStore {
    /// Opens the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CredentialStoreError> {
        let path = path.into();
        let tokens = match fs::read(&path) {
            Ok(bytes) => from_json_bytes(&bytes)
                .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Tokens::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "opened credential store");

        Ok(Self {
            path,
            tokens: RwLock::new(tokens),
        })
    }

    /// Opens the store at [`FileCredentialStore::default_path`].
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError::NoConfigDir`] when the platform has no
    /// config directory, otherwise as [`FileCredentialStore::open`].
    pub fn open_default() -> Result<Self, CredentialStoreError> {
        let path = Self::default_path().ok_or(CredentialStoreError::NoConfigDir)?;
        Self::open(path)
    }

    /// `<config dir>/lifeos/credentials.json`, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lifeos").join("credentials.json"))
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the tokens, persists the copy, then
    /// publishes it to readers.
    fn update(&self, change: impl FnOnce(&mut Tokens)) -> Result<(), CredentialStoreError> {
        let mut tokens = self.tokens.write();
        let mut next = tokens.clone();
        change(&mut next);
        self.persist(&next)?;
        *tokens = next;
        Ok(())
    }

    fn persist(&self, tokens: &Tokens) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent() {
            off_worker(|| fs::create_dir_all(parent))?;
        }
        let bytes = to_json_stable_bytes(tokens)
            .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;

        let staging = self.path.with_extension("json.tmp");
        off_worker(|| {
            fs::write(&staging, bytes)?;
            fs::rename(&staging, &self.path)
        })?;
        Ok(())
    }
}

/// Runs blocking `io` via [`block_in_place`] when on a multi-thread runtime.
fn off_worker<T>(io: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => block_in_place(io),
        _ => io(),
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: CredentialKey) -> Option<String> {
        self.tokens.read().get(key.as_str()).cloned()
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), CredentialStoreError> {
        self.update(|tokens| {
            tokens.insert(key.as_str().to_string(), value.to_string());
        })
    }

    fn remove(&self, key: CredentialKey) -> Result<(), CredentialStoreError> {
        self.update(|tokens| {
            tokens.remove(key.as_str());
        })
    }

    fn replace_pair(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        self.update(|tokens| {
            tokens.insert(CredentialKey::Access.as_str().to_string(), pair.access.clone());
            tokens.insert(CredentialKey::Refresh.as_str().to_string(), pair.refresh.clone());
        })
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        self.update(|tokens| {
            for key in CredentialKey::ALL {
                tokens.remove(key.as_str());
            }
        })
    }

    fn pair(&self) -> Option<CredentialPair> {
        let tokens = self.tokens.read();
        Some(CredentialPair::new(
            tokens.get(CredentialKey::Access.as_str())?.clone(),
            tokens.get(CredentialKey::Refresh.as_str())?.clone(),
        ))
    }
}
