//! Application error types

use lifeos_domain::{ApiResponse, DomainError, StatusCode, ValidationErrors};
use thiserror::Error;

use crate::ports::{CredentialStoreError, HttpClientError};

/// Why a token refresh did not produce a new access token.
///
/// Cloned to every request queued behind the refresh that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// There is no refresh token to exchange.
    #[error("no refresh token stored")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a non-2xx status.
    #[error("refresh rejected with status {status}")]
    Rejected {
        /// Status returned by the refresh endpoint.
        status: StatusCode,
        /// Response body, as text.
        body: String,
    },

    /// The refresh call got no response.
    #[error("refresh request failed: {0}")]
    Transport(String),

    /// The refresh endpoint answered 2xx without a usable token.
    #[error("invalid refresh response: {0}")]
    InvalidResponse(String),

    /// The new token could not be written to the credential store.
    #[error("failed to store refreshed token: {0}")]
    Storage(String),

    /// The refresh was dropped before it settled.
    #[error("token refresh abandoned before completion")]
    Abandoned,

    /// The session was signed out or replaced while the refresh was in
    /// flight; the renewed token was discarded.
    #[error("session ended while the token was being refreshed")]
    SessionEnded,
}

/// Errors surfaced to callers of the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No response was received.
    #[error("transport error: {0}")]
    Transport(#[from] HttpClientError),

    /// The API answered with a non-2xx status.
    #[error("request failed with status {}", .0.status)]
    Status(Box<ApiResponse>),

    /// The access token expired and could not be renewed.
    #[error("token refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// The credential store failed.
    #[error("credential store error: {0}")]
    Credentials(#[from] CredentialStoreError),

    /// A request could not be built or a response could not be decoded.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl GatewayError {
    /// HTTP status of the failed response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|response| response.status)
    }

    /// The failed response, if one was received.
    #[must_use]
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            Self::Status(response) => Some(response),
            _ => None,
        }
    }

    /// Whether the API answered 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status().is_some_and(|status| status.is_unauthorized())
    }

    /// Field errors carried by a 4xx response body.
    #[must_use]
    pub fn validation_errors(&self) -> Option<ValidationErrors> {
        self.response()
            .filter(|response| response.status.is_client_error())
            .and_then(|response| ValidationErrors::from_body(&response.body))
    }
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
