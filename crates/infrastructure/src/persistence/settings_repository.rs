//! Client settings persistence.
//!
//! Reads settings from the platform-specific config directory:
//! - Linux: ~/.config/lifeos/settings.json
//! - macOS: ~/Library/Application Support/lifeos/settings.json
//! - Windows: %APPDATA%/lifeos/settings.json
//!
//! Environment variables take precedence over the file.

use std::path::{Path, PathBuf};

use lifeos_domain::ClientSettings;
use tokio::fs;
use tracing::debug;

use crate::serialization::{SerializationError, from_json_bytes};

/// Overrides [`ClientSettings::base_url`].
pub const API_URL_VAR: &str = "LIFEOS_API_URL";

/// Overrides [`ClientSettings::timeout_ms`].
pub const TIMEOUT_VAR: &str = "LIFEOS_TIMEOUT_MS";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A setting, from the file or the environment, is unusable.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Setting or variable name.
        name: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Repository for client settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepository {
    /// Creates a repository reading the default settings file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: dirs::config_dir().map(|p| p.join("lifeos").join("settings.json")),
        }
    }

    /// Creates a repository reading `path`.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the path where settings are read from, if available.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads settings from disk, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or an
    /// override or the resulting base URL is invalid.
    pub async fn load(&self) -> Result<ClientSettings, SettingsError> {
        let settings = self.load_file().await?;
        apply_overrides(settings, |name| std::env::var(name).ok())
    }

    /// Loads settings from disk only.
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_file(&self) -> Result<ClientSettings, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(ClientSettings::default());
        };

        match fs::read(path).await {
            Ok(content) => {
                debug!(path = %path.display(), "loaded settings file");
                Ok(from_json_bytes(&content)?)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientSettings::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Applies environment overrides read through `lookup` and validates the result.
///
/// Empty values are ignored.
///
/// # Errors
///
/// Returns [`SettingsError::InvalidValue`] for a non-numeric timeout or a
/// base URL that does not parse.
pub fn apply_overrides(
    mut settings: ClientSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ClientSettings, SettingsError> {
    let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(url) = var(API_URL_VAR) {
        settings.base_url = url.trim().to_string();
    }

    if let Some(raw) = var(TIMEOUT_VAR) {
        settings.timeout_ms = raw
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidValue {
                name: TIMEOUT_VAR,
                value: raw.clone(),
            })?;
    }

    if settings.resolve_url("/").is_err() {
        return Err(SettingsError::InvalidValue {
            name: "base_url",
            value: settings.base_url,
        });
    }

    Ok(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let repo = SettingsRepository::with_path(dir.path().join("settings.json"));

        assert_eq!(repo.load_file().await.unwrap(), ClientSettings::default());
    }

    #[tokio::test]
    async fn test_file_values_are_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"base_url": "https://lifeos.example.com/api", "timeout_ms": 5000}"#,
        )
        .unwrap();

        let settings = SettingsRepository::with_path(&path).load_file().await.unwrap();

        assert_eq!(settings.base_url, "https://lifeos.example.com/api");
        assert_eq!(settings.timeout_ms, 5000);
        assert_eq!(settings.refresh_path, "/auth/token/refresh/");
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{").unwrap();

        let result = SettingsRepository::with_path(&path).load_file().await;

        assert!(matches!(result, Err(SettingsError::Serialization(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let settings = apply_overrides(
            ClientSettings::default(),
            env(&[(API_URL_VAR, "https://api.test"), (TIMEOUT_VAR, "1500")]),
        )
        .unwrap();

        assert_eq!(settings.base_url, "https://api.test");
        assert_eq!(settings.timeout_ms, 1500);
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let settings =
            apply_overrides(ClientSettings::default(), env(&[(API_URL_VAR, "  ")])).unwrap();
        assert_eq!(settings.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let error =
            apply_overrides(ClientSettings::default(), env(&[(TIMEOUT_VAR, "soon")])).unwrap_err();

        assert!(matches!(
            error,
            SettingsError::InvalidValue { name: TIMEOUT_VAR, .. }
        ));
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let error = apply_overrides(ClientSettings::default(), env(&[(API_URL_VAR, "not a url")]))
            .unwrap_err();

        assert!(matches!(error, SettingsError::InvalidValue { name: "base_url", .. }));
    }
}
