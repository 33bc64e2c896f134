//! Authenticated request gateway.
//!
//! Every API call goes through [`AuthGateway::execute`]. The gateway
//! attaches the stored access token, and when the API answers 401 it
//! renews the token through the refresh endpoint and replays the call.
//! Concurrent 401s share one refresh via [`RefreshCoordinator`]; each
//! request is replayed at most once.

use std::sync::Arc;

use lifeos_domain::{
    AUTHORIZATION, ApiRequest, ApiResponse, ClientSettings, CredentialKey, CredentialPair,
    RefreshRequest, RefreshResponse, SessionEvent, bearer_value, token_preview,
};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::events::SessionEvents;
use super::refresh::{Flight, FlightGuard, RefreshCoordinator};
use crate::error::{GatewayError, GatewayResult, RefreshError};
use crate::ports::{CredentialStore, CredentialStoreError, HttpClient, SessionTerminator};

/// Wraps the HTTP port with bearer authentication and token refresh.
pub struct AuthGateway {
    settings: ClientSettings,
    http: Arc<dyn HttpClient>,
    store: Arc<dyn CredentialStore>,
    terminator: Arc<dyn SessionTerminator>,
    events: SessionEvents,
    refresh: RefreshCoordinator,
    /// `Authorization` value installed by the last successful refresh,
    /// used when the store holds no access token.
    default_authorization: RwLock<Option<String>>,
    /// Bumped whenever the session is replaced, signed out or ended. A
    /// refresh only commits its token if the epoch it started in is
    /// still current; held while committing.
    session_epoch: Mutex<u64>,
}

impl AuthGateway {
    /// Creates a gateway over the given ports.
    #[must_use]
    pub fn new(
        settings: ClientSettings,
        http: Arc<dyn HttpClient>,
        store: Arc<dyn CredentialStore>,
        terminator: Arc<dyn SessionTerminator>,
    ) -> Self {
        Self {
            settings,
            http,
            store,
            terminator,
            events: SessionEvents::new(),
            refresh: RefreshCoordinator::new(),
            default_authorization: RwLock::new(None),
            session_epoch: Mutex::new(0),
        }
    }

    /// Publishes session events on `events` instead of a private channel.
    #[must_use]
    pub fn with_events(mut self, events: SessionEvents) -> Self {
        self.events = events;
        self
    }

    /// Client settings.
    #[must_use]
    pub const fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Session event channel.
    #[must_use]
    pub const fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Credential store the gateway reads tokens from.
    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    /// Whether a token refresh is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    /// Number of requests queued behind the in-flight refresh.
    #[must_use]
    pub fn queued_requests(&self) -> usize {
        self.refresh.waiting()
    }

    /// Stores `pair` as a new session. A refresh still in flight for the
    /// previous session will not overwrite it.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be written.
    pub fn start_session(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        let _session = self.invalidate_session();
        self.store.replace_pair(pair)
    }

    /// Discards both tokens and the default authorization. A refresh still
    /// in flight settles with [`RefreshError::SessionEnded`] instead of
    /// storing its token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be cleared.
    pub fn sign_out(&self) -> Result<(), CredentialStoreError> {
        let _session = self.invalidate_session();
        self.store.clear()
    }

    /// Starts a new session epoch and forgets the default authorization.
    ///
    /// The returned guard keeps refreshes from committing until dropped.
    fn invalidate_session(&self) -> MutexGuard<'_, u64> {
        let mut epoch = self.session_epoch.lock();
        *epoch = epoch.wrapping_add(1);
        *self.default_authorization.write() = None;
        epoch
    }

    /// Sends `request`, refreshing the access token once if the API answers 401.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Transport`] when no response arrives.
    /// - [`GatewayError::Status`] for a non-2xx response that is not recovered,
    ///   including a 401 when no refresh token is stored.
    /// - [`GatewayError::Refresh`] when the refresh this request depended on failed.
    pub async fn execute(&self, request: ApiRequest) -> GatewayResult<ApiResponse> {
        let attached = self.attach(request.clone());
        match self.dispatch(&attached).await {
            Ok(response) => Ok(response),
            Err(error) => self.recover(request, error).await,
        }
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`].
    pub async fn get(&self, path: &str) -> GatewayResult<ApiResponse> {
        self.execute(ApiRequest::get(path)).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`].
    pub async fn delete(&self, path: &str) -> GatewayResult<ApiResponse> {
        self.execute(ApiRequest::delete(path)).await
    }

    /// Sends `body` as JSON with POST.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`]; also fails if `body` cannot be serialized.
    pub async fn post<B>(&self, path: &str, body: &B) -> GatewayResult<ApiResponse>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.execute(ApiRequest::post(path).with_json(body)?).await
    }

    /// Sends `body` as JSON with PUT.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`]; also fails if `body` cannot be serialized.
    pub async fn put<B>(&self, path: &str, body: &B) -> GatewayResult<ApiResponse>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.execute(ApiRequest::put(path).with_json(body)?).await
    }

    /// Sends `body` as JSON with PATCH.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`]; also fails if `body` cannot be serialized.
    pub async fn patch<B>(&self, path: &str, body: &B) -> GatewayResult<ApiResponse>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.execute(ApiRequest::patch(path).with_json(body)?).await
    }

    /// Sends a GET request and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`]; also fails if the reply does not decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        Ok(self.get(path).await?.json()?)
    }

    /// Sends `body` as JSON with POST and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`]; also fails if the reply does not decode as `T`.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        Ok(self.post(path, body).await?.json()?)
    }

    /// Sends `body` as JSON with PUT and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`]; also fails if the reply does not decode as `T`.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        Ok(self.put(path, body).await?.json()?)
    }

    /// Sends `body` as JSON with PATCH and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// See [`AuthGateway::execute`]; also fails if the reply does not decode as `T`.
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> GatewayResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        Ok(self.patch(path, body).await?.json()?)
    }

    /// Sets the bearer header from the store, or from the last refresh.
    fn attach(&self, request: ApiRequest) -> ApiRequest {
        if let Some(token) = self.store.get(CredentialKey::Access) {
            return request.with_bearer(&token);
        }
        let fallback = self.default_authorization.read().clone();
        match fallback {
            Some(value) => request.with_header(AUTHORIZATION, value),
            None => request,
        }
    }

    /// Sends one attempt; non-2xx responses become [`GatewayError::Status`].
    async fn dispatch(&self, request: &ApiRequest) -> GatewayResult<ApiResponse> {
        debug!(
            request_id = %request.id(),
            method = %request.method(),
            path = request.path(),
            retried = request.is_retried(),
            authenticated = request.authorization().is_some(),
            "sending request"
        );
        let response = self.http.execute(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            if response.status.is_server_error() {
                warn!(request_id = %request.id(), status = %response.status, "server error");
            } else {
                debug!(request_id = %request.id(), status = %response.status, "request failed");
            }
            Err(GatewayError::Status(Box::new(response)))
        }
    }

    /// Decides whether a failure is recoverable by refreshing, and if so
    /// replays the request with the new token.
    async fn recover(&self, request: ApiRequest, error: GatewayError) -> GatewayResult<ApiResponse> {
        if !error.is_unauthorized()
            || request.is_retried()
            || self.settings.is_refresh_endpoint(request.path())
        {
            return Err(error);
        }

        let request = request.into_retry();
        let token = match self.refresh.join() {
            Flight::Follower(waiter) => {
                debug!(request_id = %request.id(), "token refresh in flight, queueing request");
                waiter.wait().await?
            }
            Flight::Leader(flight) => self.lead_refresh(flight, error).await?,
        };

        debug!(request_id = %request.id(), "replaying request with refreshed token");
        self.dispatch(&request.with_bearer(&token)).await
    }

    /// Runs the refresh this caller is leading and settles the flight.
    async fn lead_refresh(
        &self,
        flight: FlightGuard<'_>,
        unauthorized: GatewayError,
    ) -> GatewayResult<String> {
        let epoch = *self.session_epoch.lock();
        let Some(refresh_token) = self.store.get(CredentialKey::Refresh) else {
            warn!("access token rejected and no refresh token stored, ending session");
            flight.settle(&Err(RefreshError::MissingRefreshToken));
            self.end_session(epoch);
            return Err(unauthorized);
        };

        let outcome = self.request_refresh(&refresh_token, epoch).await;
        let released = flight.settle(&outcome);

        match outcome {
            Ok(token) => {
                info!(released, token = %token_preview(&token), "access token refreshed");
                Ok(token)
            }
            Err(RefreshError::SessionEnded) => {
                debug!(released, "session changed during token refresh, discarding token");
                Err(RefreshError::SessionEnded.into())
            }
            Err(error) => {
                warn!(%error, released, "token refresh failed, ending session");
                self.end_session(epoch);
                Err(error.into())
            }
        }
    }

    /// Exchanges the refresh token for a new access token and stores it,
    /// unless the session moved past `epoch` meanwhile.
    ///
    /// Goes to the HTTP port directly: the refresh call carries no bearer
    /// header and is never itself retried.
    async fn request_refresh(&self, refresh_token: &str, epoch: u64) -> Result<String, RefreshError> {
        let request = ApiRequest::post(self.settings.refresh_path.as_str())
            .with_json(&RefreshRequest {
                refresh: refresh_token.to_string(),
            })
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let response = self
            .http
            .execute(&request)
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        if !response.is_success() {
            return Err(RefreshError::Rejected {
                status: response.status,
                body: response.text(),
            });
        }

        let renewed: RefreshResponse = response
            .json()
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

        let session = self.session_epoch.lock();
        if *session != epoch {
            return Err(RefreshError::SessionEnded);
        }

        let stored = match &renewed.refresh {
            Some(rotated) => self
                .store
                .replace_pair(&CredentialPair::new(renewed.access.as_str(), rotated.as_str())),
            None => self.store.set(CredentialKey::Access, &renewed.access),
        };
        stored.map_err(|e| RefreshError::Storage(e.to_string()))?;

        *self.default_authorization.write() = Some(bearer_value(&renewed.access));
        drop(session);

        self.events.emit(SessionEvent::TokenRefreshed {
            token_preview: token_preview(&renewed.access),
        });

        Ok(renewed.access)
    }

    /// Terminates the session the failed refresh belonged to. A session
    /// started or signed out since `epoch` is left alone.
    fn end_session(&self, epoch: u64) {
        let mut current = self.session_epoch.lock();
        if *current != epoch {
            debug!("session already replaced, not terminating");
            return;
        }
        *current = current.wrapping_add(1);
        *self.default_authorization.write() = None;
        self.terminator.terminate();
    }
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("base_url", &self.settings.base_url)
            .field("refreshing", &self.is_refreshing())
            .field("queued", &self.queued_requests())
            .finish_non_exhaustive()
    }
}
