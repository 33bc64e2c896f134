//! Session events and status

use serde::{Deserialize, Serialize};

/// Events published as the session changes, for whatever renders the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Tokens were obtained with username and password.
    LoggedIn {
        /// Account name used to log in.
        username: String,
    },
    /// The access token was renewed.
    TokenRefreshed {
        /// Preview of the new access token.
        token_preview: String,
    },
    /// The user logged out.
    LoggedOut {
        /// Route the UI should navigate to.
        redirect_to: String,
    },
    /// Credentials could not be renewed and were discarded.
    Terminated {
        /// Route the UI should navigate to.
        redirect_to: String,
    },
}

impl SessionEvent {
    /// Navigation target carried by the event, if any.
    #[must_use]
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::LoggedOut { redirect_to } | Self::Terminated { redirect_to } => {
                Some(redirect_to)
            }
            Self::LoggedIn { .. } | Self::TokenRefreshed { .. } => None,
        }
    }
}

/// What the client currently believes about the session.
///
/// Authentication is optimistic: a stored access token counts as a live
/// session until the API answers 401.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    /// No access token stored.
    Anonymous,
    /// An access token is stored.
    Authenticated {
        /// Preview of the access token.
        access_preview: String,
        /// Whether a refresh token is stored too.
        can_refresh: bool,
    },
}

impl SessionStatus {
    /// Returns true when an access token is stored.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Anonymous => "Not logged in".to_string(),
            Self::Authenticated {
                access_preview,
                can_refresh: true,
            } => format!("Logged in ({access_preview}, auto-refresh enabled)"),
            Self::Authenticated {
                access_preview,
                can_refresh: false,
            } => format!("Logged in ({access_preview}, no refresh token)"),
        }
    }
}
