//! Life OS API client.
//!
//! Wires the reqwest adapter, a credential store and the redirecting
//! session terminator into an [`AuthGateway`] and a [`SessionService`].

pub mod cli;

use std::sync::Arc;

use lifeos_application::ports::{CredentialStore, HttpClientError};
use lifeos_application::{AuthGateway, SessionEvents, SessionService};
use lifeos_domain::ClientSettings;
use lifeos_infrastructure::{RedirectSessionTerminator, ReqwestHttpClient};

/// A connected client: the gateway for API calls and the session service
/// for login and logout, sharing one credential store and event channel.
#[derive(Debug, Clone)]
pub struct LifeOs {
    /// Gateway every API call goes through.
    pub gateway: Arc<AuthGateway>,
    /// Login, registration and logout.
    pub session: SessionService,
    /// Session events from the gateway, the terminator and the session service.
    pub events: SessionEvents,
}

impl LifeOs {
    /// Builds a client for `settings` keeping tokens in `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn connect(
        settings: ClientSettings,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, HttpClientError> {
        let http = Arc::new(ReqwestHttpClient::from_settings(&settings)?);
        let events = SessionEvents::new();
        let terminator = Arc::new(RedirectSessionTerminator::new(
            store.clone(),
            events.clone(),
            settings.login_route.as_str(),
        ));

        let gateway = Arc::new(
            AuthGateway::new(settings, http, store, terminator).with_events(events.clone()),
        );
        let session = SessionService::new(gateway.clone());

        Ok(Self {
            gateway,
            session,
            events,
        })
    }
}
