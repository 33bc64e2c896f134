//! HTTP client port

use async_trait::async_trait;
use lifeos_domain::{ApiRequest, ApiResponse};

/// Transport-level failures: no HTTP response was received.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The request timed out.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// DNS resolution failed.
    #[error("could not resolve host {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Underlying error message.
        message: String,
    },

    /// The server refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be sent.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

/// Port for sending a single HTTP request.
///
/// Implementations return every HTTP response as `Ok`, whatever its
/// status; classifying statuses is the gateway's job.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends `request` and returns the response.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received.
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, HttpClientError>;
}
