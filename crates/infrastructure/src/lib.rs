//! Life OS Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the reqwest HTTP client, the
//! file-backed credential store, the redirecting session terminator
//! and the settings loader.

pub mod adapters;
pub mod persistence;
pub mod serialization;

pub use adapters::{RedirectSessionTerminator, ReqwestHttpClient};
pub use persistence::{
    API_URL_VAR, FileCredentialStore, SettingsError, SettingsRepository, TIMEOUT_VAR,
    apply_overrides,
};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};
