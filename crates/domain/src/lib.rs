//! Life OS Domain - Core client types
//!
//! This crate defines the domain model for the Life OS API client:
//! requests, responses, credentials, auth payloads and client settings.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod id;
pub mod request;
pub mod response;
pub mod settings;
pub mod validation;

pub use auth::{
    CredentialKey, CredentialPair, LoginRequest, RefreshRequest, RefreshResponse,
    RegisterRequest, SessionEvent, SessionStatus, TokenPairResponse, bearer_value, token_preview,
};
pub use error::{DomainError, DomainResult};
pub use id::RequestId;
pub use request::{AUTHORIZATION, ApiRequest, Header, HttpMethod};
pub use response::{ApiResponse, StatusCode};
pub use settings::ClientSettings;
pub use validation::ValidationErrors;
