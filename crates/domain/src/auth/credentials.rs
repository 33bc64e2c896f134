//! Credential keys and pairs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keys under which tokens live in a credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// Short-lived access token.
    Access,
    /// Longer-lived refresh token.
    Refresh,
}

impl CredentialKey {
    /// Both keys, access first.
    pub const ALL: [Self; 2] = [Self::Access, Self::Refresh];

    /// The storage key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An access/refresh token pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    /// Access token.
    pub access: String,
    /// Refresh token.
    pub refresh: String,
}

impl CredentialPair {
    /// Creates a pair.
    #[must_use]
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Tokens never show up in full in debug output.
impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &token_preview(&self.access))
            .field("refresh", &token_preview(&self.refresh))
            .finish()
    }
}

/// Formats an `Authorization` header value for a bearer token.
#[must_use]
pub fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

/// Get a preview of a token (first 8 chars + ...), safe for logs.
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.len() > 12 {
        let cut = token
            .char_indices()
            .nth(8)
            .map_or(token.len(), |(idx, _)| idx);
        format!("{}...", &token[..cut])
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_storage_keys() {
        assert_eq!(CredentialKey::Access.as_str(), "access_token");
        assert_eq!(CredentialKey::Refresh.to_string(), "refresh_token");
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcdefgh...");
        assert_eq!(token_preview("short"), "short");
    }

    #[test]
    fn test_debug_hides_tokens() {
        let pair = CredentialPair::new("eyJhbGciOiJIUzI1NiJ9.payload", "R1");
        let debug = format!("{pair:?}");
        assert!(debug.contains("eyJhbGci..."));
        assert!(!debug.contains("payload"));
    }

    #[test]
    fn test_bearer_value() {
        assert_eq!(bearer_value("A2"), "Bearer A2");
    }
}
