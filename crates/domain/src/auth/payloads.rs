//! Wire payloads of the authentication endpoints.

use serde::{Deserialize, Serialize};

use super::CredentialPair;

/// Body of `POST /auth/token/refresh/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// The stored refresh token.
    pub refresh: String,
}

/// Successful reply of the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// The new access token.
    pub access: String,
    /// A rotated refresh token, when the server rotates them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Body of `POST /auth/token/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Reply of the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPairResponse {
    /// Access token.
    pub access: String,
    /// Refresh token.
    pub refresh: String,
}

impl From<TokenPairResponse> for CredentialPair {
    fn from(response: TokenPairResponse) -> Self {
        Self::new(response.access, response.refresh)
    }
}

/// Body of `POST /auth/register/`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired account name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation, checked server side.
    pub password_confirm: String,
}

impl RegisterRequest {
    /// Creates a registration where the confirmation repeats the password.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            email: email.into(),
            password_confirm: password.clone(),
            password,
        }
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_refresh_request_shape() {
        let body = serde_json::to_value(RefreshRequest {
            refresh: "R1".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"refresh": "R1"}));
    }

    #[test]
    fn test_refresh_response_without_rotation() {
        let response: RefreshResponse = serde_json::from_value(json!({"access": "A2"})).unwrap();
        assert_eq!(response.access, "A2");
        assert_eq!(response.refresh, None);
    }

    #[test]
    fn test_refresh_response_with_rotation() {
        let response: RefreshResponse =
            serde_json::from_value(json!({"access": "A2", "refresh": "R2"})).unwrap();
        assert_eq!(response.refresh.as_deref(), Some("R2"));
    }

    #[test]
    fn test_register_request_shape() {
        let body = serde_json::to_value(RegisterRequest::new("ada", "ada@example.com", "pw")).unwrap();
        assert_eq!(
            body,
            json!({
                "username": "ada",
                "email": "ada@example.com",
                "password": "pw",
                "password_confirm": "pw"
            })
        );
    }

    #[test]
    fn test_login_debug_masks_password() {
        let login = LoginRequest {
            username: "ada".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{login:?}").contains("hunter2"));
    }
}
