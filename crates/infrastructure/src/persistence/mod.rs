//! File-backed persistence for credentials and client settings.

mod credential_store;
mod settings_repository;

pub use credential_store::FileCredentialStore;
pub use settings_repository::{
    API_URL_VAR, SettingsError, SettingsRepository, TIMEOUT_VAR, apply_overrides,
};
