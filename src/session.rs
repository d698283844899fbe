//! Session store: the single owner of authentication state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Holds `{ is_authenticated, user }` for the process lifetime and is the only
//! component that reads or writes the persisted token slot. The API client reads
//! the token through the [`TokenSource`] impl; the guard and the view-models go
//! through [`SessionStore::log_in`] / [`SessionStore::log_out`] and the helpers
//! built on them.
//!
//! DESIGN
//! ======
//! The "logged in?" observable fans out to one unbounded channel per subscriber.
//! Each transition writes storage, updates the cached state and publishes under
//! one mutex, so every subscriber receives every transition, in the order they
//! happened, however late it polls.
//!
//! The stream's initial value is "a token is present in storage", an unverified
//! guess for renderers. The cached `authenticated` flag the guard trusts starts
//! false and only turns true through [`SessionStore::log_in`], so a persisted
//! token is always verified once per process before protected views open.
//!
//! ERROR HANDLING
//! ==============
//! Storage failures are logged and never surface to callers: the in-memory token
//! copy stays authoritative for this process, so the interceptor keeps working
//! even when the disk write failed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt;
use futures::channel::mpsc;
use futures::stream::BoxStream;

use crate::api::{MddApi, TokenSource};
use crate::error::ApiError;
use crate::models::User;
use crate::storage::{TOKEN_KEY, TokenStorage};

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

/// Point-in-time copy of the session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub user: Option<User>,
}

#[derive(Default)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    authenticated: bool,
    /// Last value published on the "logged in?" stream.
    published: bool,
    subscribers: Vec<mpsc::UnboundedSender<bool>>,
}

impl SessionState {
    fn publish(&mut self, value: bool) {
        self.published = value;
        self.subscribers.retain(|tx| tx.unbounded_send(value).is_ok());
    }
}

pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Open the store over `storage`, seeding "logged in?" from token presence.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        let token = match storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read persisted token; starting logged out");
                None
            }
        };
        let token_present = token.is_some();
        tracing::debug!(token_present, "session store opened");
        Self {
            storage,
            state: Mutex::new(SessionState { token, published: token_present, ..SessionState::default() }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    /// A fresh stream of "logged in?" values: the current value first, then
    /// every transition published after the call. Ends when the store is dropped.
    #[must_use]
    pub fn is_logged_stream(&self) -> BoxStream<'static, bool> {
        let (tx, rx) = mpsc::unbounded();
        let mut state = self.lock();
        if tx.unbounded_send(state.published).is_ok() {
            state.subscribers.push(tx);
        }
        rx.boxed()
    }

    /// The value most recently published on the "logged in?" stream.
    #[must_use]
    pub fn logged_value(&self) -> bool {
        self.lock().published
    }

    /// Whether this process has confirmed the session via [`SessionStore::log_in`].
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.lock().authenticated
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.lock().token.as_deref().is_some_and(|t| !t.is_empty())
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot { is_authenticated: state.authenticated, user: state.user.clone() }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Persist `token`, cache `user`, mark the session authenticated and publish.
    pub fn log_in(&self, user: User, token: &str) {
        let mut state = self.lock();
        self.persist(token);
        let user_id = user.id;
        state.token = Some(token.to_owned());
        state.user = Some(user);
        state.authenticated = true;
        state.publish(true);
        tracing::info!(user_id, "session logged in");
    }

    /// Remove the token, drop the cached user, mark unauthenticated and publish.
    pub fn log_out(&self) {
        let mut state = self.lock();
        if let Err(e) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to remove persisted token");
        }
        state.token = None;
        state.user = None;
        state.authenticated = false;
        state.publish(false);
        tracing::info!("session logged out");
    }

    /// Overlay `profile` onto the cached user and return the merged result.
    pub fn merge_user(&self, profile: User) -> User {
        let mut state = self.lock();
        let merged = match state.user.take() {
            Some(mut existing) => {
                existing.merge(profile);
                existing
            }
            None => profile,
        };
        state.user = Some(merged.clone());
        merged
    }

    /// Verify `token` with "who am I" and log in with the returned profile.
    ///
    /// On failure the stored token is left as it was; deciding whether a
    /// rejected token should be cleared is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns the error from the profile request.
    pub async fn restore_session_from_token(&self, api: &dyn MddApi, token: &str) -> Result<User, ApiError> {
        let user = api.me().await.inspect_err(|e| {
            tracing::warn!(error = %e, code = e.error_code(), "session restore failed");
        })?;
        self.log_in(user.clone(), token);
        Ok(user)
    }

    /// Adopt a freshly issued `token`: persist it, fetch the profile with it and
    /// log in. Any failure clears the token again.
    ///
    /// # Errors
    ///
    /// Returns the error from the profile request.
    pub async fn sign_in(&self, api: &dyn MddApi, token: &str) -> Result<User, ApiError> {
        self.stage_token(token);
        match api.me().await {
            Ok(user) => {
                self.log_in(user.clone(), token);
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "sign-in verification failed");
                self.log_out();
                Err(e)
            }
        }
    }

    /// Persist a token without changing the authenticated flag.
    fn stage_token(&self, token: &str) {
        let mut state = self.lock();
        self.persist(token);
        state.token = Some(token.to_owned());
    }

    fn persist(&self, token: &str) {
        if let Err(e) = self.storage.set(TOKEN_KEY, token) {
            tracing::warn!(error = %e, "failed to persist token; keeping it in memory only");
        }
    }
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}
