//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` wires the long-lived pieces together once: the token storage
//! behind the session store, the HTTP client reading its token from that
//! store, and the router with its guard. View-models are built per screen from
//! the `api` and `session` handles held here.

use std::sync::Arc;
use std::time::Duration;

use crate::api::{ApiClient, MddApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::guard::{RouteGuard, StaleTokenPolicy};
use crate::routes::Router;
use crate::session::SessionStore;
use crate::storage::{FileTokenStorage, TokenStorage};

/// Everything a front end needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn MddApi>,
    pub session: Arc<SessionStore>,
    pub router: Arc<Router>,
}

impl AppState {
    /// Assemble state over an existing API implementation and session.
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>, session: Arc<SessionStore>, guard_timeout: Duration) -> Self {
        Self::with_policy(api, session, guard_timeout, StaleTokenPolicy::default())
    }

    #[must_use]
    pub fn with_policy(
        api: Arc<dyn MddApi>,
        session: Arc<SessionStore>,
        guard_timeout: Duration,
        policy: StaleTokenPolicy,
    ) -> Self {
        let guard = RouteGuard::new(session.clone(), guard_timeout).with_policy(policy);
        let router = Arc::new(Router::new(api.clone(), guard));
        Self { api, session, router }
    }

    /// Build the production stack: file-backed token, HTTP client, router.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let storage: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(config.token_path.clone()));
        Self::from_storage(config, storage)
    }

    /// Like [`AppState::from_config`] with caller-supplied token storage.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_storage(config: &ClientConfig, storage: Arc<dyn TokenStorage>) -> Result<Self, ApiError> {
        let session = Arc::new(SessionStore::new(storage));
        let api: Arc<dyn MddApi> = Arc::new(ApiClient::from_config(config, session.clone())?);
        tracing::debug!(api_url = %config.api_url, "app state ready");
        Ok(Self::new(api, session, config.timeouts.guard()))
    }
}
