//! Scripted doubles for the gateway's ports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lifeos_domain::{
    ApiRequest, ApiResponse, ClientSettings, CredentialKey, CredentialPair, bearer_value,
};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Semaphore;

use super::MemoryCredentialStore;
use crate::ports::{
    CredentialStore, CredentialStoreError, HttpClient, HttpClientError, SessionTerminator,
};

pub type Responder = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, HttpClientError> + Send + Sync>;

/// Resources answer 200 only to `Bearer <token>`, 401 otherwise.
pub fn accept_only(token: &str) -> Responder {
    let expected = bearer_value(token);
    Box::new(move |request: &ApiRequest| {
        if request.authorization() == Some(expected.as_str()) {
            Ok(ApiResponse::json_body(200, &json!({"path": request.path()})))
        } else {
            Ok(ApiResponse::json_body(
                401,
                &json!({"detail": "Given token not valid for any token type"}),
            ))
        }
    })
}

/// Refresh endpoint granting `access`.
pub fn grant(access: &str) -> Responder {
    let access = access.to_string();
    Box::new(move |_| Ok(ApiResponse::json_body(200, &json!({"access": access}))))
}

/// Refresh endpoint answering with `status`.
pub fn reject(status: u16) -> Responder {
    Box::new(move |_| {
        Ok(ApiResponse::json_body(
            status,
            &json!({"detail": "Token is invalid or expired"}),
        ))
    })
}

/// Fake API routing refresh-endpoint calls and resource calls to separate responders.
pub struct FakeApi {
    settings: ClientSettings,
    resource: Responder,
    refresh: Responder,
    gate: Option<Semaphore>,
    log: Mutex<Vec<ApiRequest>>,
}

impl FakeApi {
    pub fn new(resource: Responder, refresh: Responder) -> Self {
        Self {
            settings: ClientSettings::default(),
            resource,
            refresh,
            gate: None,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Holds refresh calls until [`FakeApi::open_gate`].
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().clone()
    }

    pub fn refresh_calls(&self) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| self.settings.is_refresh_endpoint(r.path()))
            .collect()
    }

    /// Resource requests (not refresh calls) carrying `Bearer <token>`.
    pub fn sent_with(&self, token: &str) -> usize {
        let expected = bearer_value(token);
        self.requests()
            .iter()
            .filter(|r| !self.settings.is_refresh_endpoint(r.path()))
            .filter(|r| r.authorization() == Some(expected.as_str()))
            .count()
    }
}

#[async_trait]
impl HttpClient for FakeApi {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, HttpClientError> {
        self.log.lock().push(request.clone());
        if self.settings.is_refresh_endpoint(request.path()) {
            if let Some(gate) = &self.gate {
                let _permit = gate
                    .acquire()
                    .await
                    .map_err(|e| HttpClientError::Other(e.to_string()))?;
            }
            (self.refresh)(request)
        } else {
            (self.resource)(request)
        }
    }
}

/// Counts terminations.
#[derive(Default)]
pub struct CountingTerminator {
    calls: AtomicUsize,
}

impl CountingTerminator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SessionTerminator for CountingTerminator {
    fn terminate(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Credential store that reads and clears but refuses to write tokens.
pub struct ReadOnlyStore {
    inner: MemoryCredentialStore,
}

impl ReadOnlyStore {
    pub fn with_pair(pair: &CredentialPair) -> Self {
        Self {
            inner: MemoryCredentialStore::with_pair(pair),
        }
    }

    fn refuse() -> CredentialStoreError {
        CredentialStoreError::Serialization("store is read-only".to_string())
    }
}

impl CredentialStore for ReadOnlyStore {
    fn get(&self, key: CredentialKey) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, _key: CredentialKey, _value: &str) -> Result<(), CredentialStoreError> {
        Err(Self::refuse())
    }

    fn remove(&self, key: CredentialKey) -> Result<(), CredentialStoreError> {
        self.inner.remove(key)
    }

    fn replace_pair(&self, _pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        Err(Self::refuse())
    }

    fn clear(&self) -> Result<(), CredentialStoreError> {
        self.inner.clear()
    }
}
