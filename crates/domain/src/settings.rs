//! Client Settings Domain Model
//!
//! Where the API lives and which endpoints play the authentication roles.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Connection settings for the Life OS API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL every relative request path is joined to.
    pub base_url: String,
    /// Path of the token refresh endpoint.
    pub refresh_path: String,
    /// Path of the username/password token endpoint.
    pub login_path: String,
    /// Path of the registration endpoint.
    pub register_path: String,
    /// Route the UI is sent to when the session ends.
    pub login_route: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            refresh_path: "/auth/token/refresh/".to_string(),
            login_path: "/auth/token/".to_string(),
            register_path: "/auth/register/".to_string(),
            login_route: "/login".to_string(),
            timeout_ms: 30_000,
            user_agent: format!("lifeos/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientSettings {
    /// Settings pointing at `base_url`, everything else default.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolves a request target to an absolute URL.
    ///
    /// Absolute URLs are returned as-is; anything else is appended to the
    /// base URL, keeping any path prefix the base URL carries.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if the result is not a valid URL.
    pub fn resolve_url(&self, target: &str) -> DomainResult<Url> {
        if let Ok(url) = Url::parse(target) {
            return Ok(url);
        }
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| DomainError::InvalidUrl(format!("{e}: {joined}")))
    }

    /// Whether `target` addresses the refresh endpoint.
    ///
    /// Query strings and a trailing slash are ignored.
    #[must_use]
    pub fn is_refresh_endpoint(&self, target: &str) -> bool {
        match (self.resolve_url(target), self.resolve_url(&self.refresh_path)) {
            (Ok(target), Ok(refresh)) => {
                target.origin() == refresh.origin()
                    && target.path().trim_end_matches('/') == refresh.path().trim_end_matches('/')
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.base_url, "http://localhost:8000");
        assert_eq!(settings.refresh_path, "/auth/token/refresh/");
        assert_eq!(settings.login_route, "/login");
        assert_eq!(settings.timeout_ms, 30_000);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: ClientSettings =
            serde_json::from_str(r#"{"base_url": "https://api.example.com"}"#).unwrap();
        assert_eq!(settings.base_url, "https://api.example.com");
        assert_eq!(settings.login_path, "/auth/token/");
    }

    #[test]
    fn test_resolve_relative_keeps_prefix() {
        let settings = ClientSettings::with_base_url("https://example.com/api/");
        let url = settings.resolve_url("/tasks/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/tasks/");
    }

    #[test]
    fn test_resolve_absolute() {
        let settings = ClientSettings::default();
        let url = settings.resolve_url("https://other.example.com/x").unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/x");
    }

    #[test]
    fn test_resolve_invalid_base() {
        let settings = ClientSettings::with_base_url("not a url");
        assert!(matches!(
            settings.resolve_url("/tasks/"),
            Err(DomainError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_refresh_endpoint_detection() {
        let settings = ClientSettings::default();
        assert!(settings.is_refresh_endpoint("/auth/token/refresh/"));
        assert!(settings.is_refresh_endpoint("auth/token/refresh"));
        assert!(settings.is_refresh_endpoint("http://localhost:8000/auth/token/refresh/?x=1"));
        assert!(!settings.is_refresh_endpoint("/auth/token/"));
        assert!(!settings.is_refresh_endpoint("http://elsewhere:8000/auth/token/refresh/"));
    }
}
