//! API response payload

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use super::StatusCode;
use crate::error::{DomainError, DomainResult};

/// A response received from the Life OS API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: impl Into<StatusCode>, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status: status.into(),
            headers,
            body,
        }
    }

    /// Creates a response with a JSON body and no headers.
    #[must_use]
    pub fn json_body(status: impl Into<StatusCode>, body: &serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self::new(status, headers, body.to_string().into_bytes())
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decodes the body as JSON.
    ///
    /// An empty body decodes as JSON `null`, so `()` and `Option<T>` work
    /// for 204 responses.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidResponse`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> DomainResult<T> {
        let bytes: &[u8] = if self.body.is_empty() { b"null" } else { &self.body };
        serde_json::from_slice(bytes).map_err(|e| DomainError::InvalidResponse(e.to_string()))
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Looks up a header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
