//! Session terminator that clears credentials and redirects to login.

use std::sync::Arc;

use lifeos_application::SessionEvents;
use lifeos_application::ports::{CredentialStore, SessionTerminator};
use lifeos_domain::SessionEvent;
use tracing::{error, info};

/// Ends the session by discarding both tokens and announcing a redirect
/// to the login route on the session event channel.
pub struct RedirectSessionTerminator {
    store: Arc<dyn CredentialStore>,
    events: SessionEvents,
    login_route: String,
}

impl RedirectSessionTerminator {
    /// Creates a terminator over `store` publishing on `events`.
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        events: SessionEvents,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            store,
            events,
            login_route: login_route.into(),
        }
    }
}

impl SessionTerminator for RedirectSessionTerminator {
    fn terminate(&self) {
        if let Err(e) = self.store.clear() {
            error!(error = %e, "failed to clear stored credentials");
        }
        info!(redirect_to = %self.login_route, "session terminated");
        self.events.emit(SessionEvent::Terminated {
            redirect_to: self.login_route.clone(),
        });
    }
}

impl std::fmt::Debug for RedirectSessionTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectSessionTerminator")
            .field("login_route", &self.login_route)
            .finish_non_exhaustive()
    }
}
