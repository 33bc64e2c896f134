//! Authentication domain types

mod credentials;
mod payloads;
mod session;

pub use credentials::{CredentialKey, CredentialPair, bearer_value, token_preview};
pub use payloads::{
    LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, TokenPairResponse,
};
pub use session::{SessionEvent, SessionStatus};
