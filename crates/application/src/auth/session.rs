//! Session service: login, registration, logout and status.

use std::sync::Arc;

use lifeos_domain::{
    CredentialKey, CredentialPair, LoginRequest, RegisterRequest, SessionEvent,
    SessionStatus, TokenPairResponse, token_preview,
};
use tokio::sync::broadcast;
use tracing::info;

use super::gateway::AuthGateway;
use crate::error::GatewayResult;

/// User-facing session operations on top of an [`AuthGateway`].
///
/// Authentication is optimistic: a stored access token is treated as a
/// live session until the API rejects it.
#[derive(Debug, Clone)]
pub struct SessionService {
    gateway: Arc<AuthGateway>,
}

impl SessionService {
    /// Creates a session service sharing `gateway`.
    #[must_use]
    pub const fn new(gateway: Arc<AuthGateway>) -> Self {
        Self { gateway }
    }

    /// The gateway API calls go through.
    #[must_use]
    pub fn gateway(&self) -> &AuthGateway {
        &self.gateway
    }

    /// Exchanges username and password for a token pair and stores it.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the API rejects the credentials, or a
    /// credential store error if the pair cannot be saved.
    pub async fn login(&self, username: &str, password: &str) -> GatewayResult<CredentialPair> {
        let settings = self.gateway.settings();
        let tokens: TokenPairResponse = self
            .gateway
            .post_json(
                &settings.login_path,
                &LoginRequest {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;

        let pair = CredentialPair::from(tokens);
        self.gateway.start_session(&pair)?;

        info!(username, "logged in");
        self.gateway.events().emit(SessionEvent::LoggedIn {
            username: username.to_string(),
        });
        Ok(pair)
    }

    /// Creates an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; for a 400 the field messages are
    /// available through [`crate::GatewayError::validation_errors`].
    pub async fn register(&self, request: &RegisterRequest) -> GatewayResult<()> {
        self.gateway
            .post(&self.gateway.settings().register_path, request)
            .await?;
        info!("account registered");
        Ok(())
    }

    /// Discards both tokens. A token refresh still in flight is not stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be cleared.
    pub fn logout(&self) -> GatewayResult<()> {
        self.gateway.sign_out()?;

        info!("logged out");
        self.gateway.events().emit(SessionEvent::LoggedOut {
            redirect_to: self.gateway.settings().login_route.clone(),
        });
        Ok(())
    }

    /// Whether an access token is stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.gateway.credentials().get(CredentialKey::Access).is_some()
    }

    /// Current session status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let store = self.gateway.credentials();
        store
            .get(CredentialKey::Access)
            .map_or(SessionStatus::Anonymous, |access| SessionStatus::Authenticated {
                access_preview: token_preview(&access),
                can_refresh: store.get(CredentialKey::Refresh).is_some(),
            })
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.gateway.events().subscribe()
    }
}
