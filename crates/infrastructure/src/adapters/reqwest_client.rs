//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It resolves request paths against the configured base URL and performs
//! exactly one HTTP exchange per call; retry policy lives in the gateway.

use std::collections::HashMap;
use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use lifeos_application::ports::{HttpClient, HttpClientError};
use lifeos_domain::{ApiRequest, ApiResponse, ClientSettings, HttpMethod};
use reqwest::{Client, Method, Url};
use tracing::trace;

const MAX_REDIRECTS: usize = 10;

/// HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    settings: ClientSettings,
}

impl ReqwestHttpClient {
    /// Creates a client for the API described by `settings`.
    ///
    /// Configuration:
    /// - Request timeout: `settings.timeout_ms`
    /// - Follow redirects: up to 10
    /// - User-Agent: `settings.user_agent`
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_millis(settings.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self::with_client(client, settings.clone()))
    }

    /// Creates a client around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, settings: ClientSettings) -> Self {
        Self { client, settings }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Absolute URL for `request`, query parameters included.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, HttpClientError> {
        let mut url = self
            .settings
            .resolve_url(request.path())
            .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;
        if !request.query().is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in request.query() {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Maps reqwest errors to the port's `HttpClientError`.
    fn map_error(&self, error: &reqwest::Error) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout {
                timeout_ms: self.settings.timeout_ms,
            };
        }

        if error.is_connect() {
            let message = error_chain(error);
            let lowered = message.to_lowercase();
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return HttpClientError::DnsError { host, message };
            }
            if lowered.contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host,
                    port: error
                        .url()
                        .and_then(Url::port_or_known_default)
                        .unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_builder() {
            return HttpClientError::InvalidBody(error_chain(error));
        }

        HttpClientError::Other(error_chain(error))
    }
}

/// Display of `error` followed by each of its sources.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, HttpClientError> {
        let url = self.url_for(request)?;
        trace!(request_id = %request.id(), %url, "http exchange");

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method()), url);

        for header in request.headers() {
            builder = builder.header(&header.name, &header.value);
        }

        // Sets Content-Type: application/json as well
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(&e))?;

        let status = response.status().as_u16();

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::Other(format!("failed to read body: {}", error_chain(&e))))?
            .to_vec();

        Ok(ApiResponse::new(status, headers, body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use lifeos_domain::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ReqwestHttpClient {
        ReqwestHttpClient::from_settings(&ClientSettings::with_base_url(server.uri())).unwrap()
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Patch),
            Method::PATCH
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_url_for_appends_query() {
        let client =
            ReqwestHttpClient::from_settings(&ClientSettings::with_base_url("http://api.test/v1"))
                .unwrap();
        let request = ApiRequest::get("/tasks/").with_query("status", "open");

        let url = client.url_for(&request).unwrap();

        assert_eq!(url.as_str(), "http://api.test/v1/tasks/?status=open");
    }

    #[test]
    fn test_url_for_without_query_has_no_question_mark() {
        let client = ReqwestHttpClient::from_settings(&ClientSettings::default()).unwrap();
        let url = client.url_for(&ApiRequest::get("/habits/")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/habits/");
    }

    #[tokio::test]
    async fn test_sends_headers_query_and_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/finance/expenses/"))
            .and(query_param("month", "2026-10"))
            .and(header("authorization", "Bearer A1"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"amount": 12})))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-request-id", "abc")
                    .set_body_json(json!({"id": 7})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = ApiRequest::post("/finance/expenses/")
            .with_query("month", "2026-10")
            .with_bearer("A1")
            .with_json_value(json!({"amount": 12}));
        let response = client_for(&server).execute(&request).await.unwrap();

        assert_eq!(response.status, StatusCode(201));
        assert_eq!(response.header("X-Request-Id"), Some("abc"));
        assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({"id": 7}));
    }

    #[tokio::test]
    async fn test_error_statuses_are_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
            .mount(&server)
            .await;

        let response = client_for(&server)
            .execute(&ApiRequest::get("/tasks/"))
            .await
            .unwrap();

        assert!(response.status.is_unauthorized());
    }

    #[tokio::test]
    async fn test_timeout_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let settings = ClientSettings {
            timeout_ms: 50,
            ..ClientSettings::with_base_url(server.uri())
        };
        let client = ReqwestHttpClient::from_settings(&settings).unwrap();

        let error = client.execute(&ApiRequest::get("/slow/")).await.unwrap_err();

        assert!(matches!(error, HttpClientError::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn test_closed_port_is_a_connection_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = ReqwestHttpClient::from_settings(&ClientSettings::with_base_url(format!(
            "http://127.0.0.1:{port}"
        )))
        .unwrap();

        let error = client.execute(&ApiRequest::get("/")).await.unwrap_err();

        match error {
            HttpClientError::ConnectionRefused { host, port: p } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(p, port);
            }
            HttpClientError::ConnectionFailed(_) => {}
            other => panic!("expected a connection error, got {other:?}"),
        }
    }
}
