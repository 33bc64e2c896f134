//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building or decoding API values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL or path is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A request body could not be encoded as JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A response body could not be decoded into the expected type.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
