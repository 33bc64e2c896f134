//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the gateway and external systems.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod credential_store;
mod http_client;
mod session_terminator;

pub use credential_store::{CredentialStore, CredentialStoreError};
pub use http_client::{HttpClient, HttpClientError};
pub use session_terminator::SessionTerminator;
