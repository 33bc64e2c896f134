//! API request specification.
//!
//! An [`ApiRequest`] is an immutable description of one call against the
//! Life OS API. Every mutation returns a new value, including marking the
//! request as retried after an authorization failure.

use serde::Serialize;

use super::HttpMethod;
use crate::auth::bearer_value;
use crate::error::{DomainError, DomainResult};
use crate::id::RequestId;

/// Name of the header carrying the bearer credential.
pub const AUTHORIZATION: &str = "Authorization";

/// A single request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A request against the Life OS API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    id: RequestId,
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<Header>,
    body: Option<serde_json::Value>,
    retried: bool,
}

impl ApiRequest {
    /// Creates a request for `path`, relative to the configured base URL or absolute.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: RequestId::new(),
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            retried: false,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Creates a PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// Creates a PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a header, replacing any header with the same name (case-insensitive).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let header = Header::new(name, value);
        self.headers
            .retain(|h| !h.name.eq_ignore_ascii_case(&header.name));
        self.headers.push(header);
        self
    }

    /// Sets `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_header(AUTHORIZATION, bearer_value(token))
    }

    /// Sets a raw JSON body.
    #[must_use]
    pub fn with_json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `body` as the JSON body of this request.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidBody`] if the value cannot be represented as JSON.
    pub fn with_json<T: Serialize + ?Sized>(self, body: &T) -> DomainResult<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| DomainError::InvalidBody(e.to_string()))?;
        Ok(self.with_json_value(value))
    }

    /// Returns a copy marked as already retried once.
    #[must_use]
    pub fn into_retry(mut self) -> Self {
        self.retried = true;
        self
    }

    /// Whether this request has already been replayed after a refresh.
    #[must_use]
    pub const fn is_retried(&self) -> bool {
        self.retried
    }

    /// Request identifier, shared by the original call and its replay.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Target path or absolute URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Headers in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Looks up a header value (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The `Authorization` header value, if any.
    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.header(AUTHORIZATION)
    }

    /// JSON body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_with_header_replaces_case_insensitively() {
        let request = ApiRequest::get("/tasks/")
            .with_header("authorization", "Bearer old")
            .with_bearer("new");

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.authorization(), Some("Bearer new"));
    }

    #[test]
    fn test_into_retry_keeps_identity() {
        let request = ApiRequest::post("/health/logs/").with_json_value(json!({"mood": 4}));
        let id = request.id();

        let retried = request.clone().into_retry();

        assert!(!request.is_retried());
        assert!(retried.is_retried());
        assert_eq!(retried.id(), id);
        assert_eq!(retried.body(), Some(&json!({"mood": 4})));
    }

    #[test]
    fn test_with_json_serializes_struct() {
        #[derive(Serialize)]
        struct Expense {
            amount: u32,
            category: &'static str,
        }

        let request = ApiRequest::post("/finance/expenses/")
            .with_json(&Expense {
                amount: 12,
                category: "food",
            })
            .unwrap();

        assert_eq!(
            request.body(),
            Some(&json!({"amount": 12, "category": "food"}))
        );
    }
}
