//! Route guard for protected views.
//!
//! DESIGN
//! ======
//! The check has three states:
//! - cached session says logged in: allow, no network
//! - no token held: deny, redirect to login
//! - token held but session not confirmed: ask the backend "who am I"
//!
//! [`evaluate`] and [`resolve_verification`] are pure so the decision table can
//! be tested without a router or a backend. [`RouteGuard`] wires them to the
//! session store and bounds the verification round trip with a timeout.
//!
//! ERROR HANDLING
//! ==============
//! Every verification failure, timeouts included, is a denial. Only an
//! authentication rejection can cost the stored token; connectivity failures
//! and timeouts leave it for the next attempt. Nothing here is fatal to the
//! caller.

use std::sync::Arc;
use std::time::Duration;

use crate::api::MddApi;
use crate::error::{ApiError, ErrorKind};
use crate::models::User;
use crate::routes::Route;
use crate::session::SessionStore;

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    Denied { redirect: Route },
}

impl GuardDecision {
    #[must_use]
    pub fn deny_to_login() -> Self {
        Self::Denied { redirect: Route::Login }
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Result of the synchronous part of the check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardCheck {
    Decided(GuardDecision),
    NeedsVerification,
}

/// What to do with the persisted token when the backend rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleTokenPolicy {
    /// Log out on 401/403, removing the rejected token.
    #[default]
    Clear,
    /// Leave the token in place and only redirect.
    Keep,
}

#[must_use]
pub fn evaluate(cached_authenticated: bool, token_present: bool) -> GuardCheck {
    if cached_authenticated {
        GuardCheck::Decided(GuardDecision::Allowed)
    } else if !token_present {
        GuardCheck::Decided(GuardDecision::deny_to_login())
    } else {
        GuardCheck::NeedsVerification
    }
}

#[must_use]
pub fn resolve_verification(outcome: &Result<User, ApiError>) -> GuardDecision {
    match outcome {
        Ok(_) => GuardDecision::Allowed,
        Err(_) => GuardDecision::deny_to_login(),
    }
}

pub struct RouteGuard {
    session: Arc<SessionStore>,
    timeout: Duration,
    policy: StaleTokenPolicy,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: Arc<SessionStore>, timeout: Duration) -> Self {
        Self { session, timeout, policy: StaleTokenPolicy::default() }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: StaleTokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> StaleTokenPolicy {
        self.policy
    }

    /// Decide whether a protected route may be entered.
    pub async fn can_activate(&self, api: &dyn MddApi) -> GuardDecision {
        match evaluate(self.session.is_logged_in(), self.session.has_token()) {
            GuardCheck::Decided(decision) => {
                if !decision.is_allowed() {
                    tracing::debug!("guard denied: no session and no token");
                }
                decision
            }
            GuardCheck::NeedsVerification => self.verify(api).await,
        }
    }

    async fn verify(&self, api: &dyn MddApi) -> GuardDecision {
        let outcome = match tokio::time::timeout(self.timeout, api.me()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ApiError::Unreachable(format!(
                "session verification timed out after {}ms",
                self.timeout.as_millis()
            ))),
        };
        let decision = resolve_verification(&outcome);

        match outcome {
            Ok(profile) => {
                // A log_out that landed during the round trip wins.
                let Some(token) = self.session.token() else {
                    tracing::info!("guard verification succeeded after logout; denying");
                    return GuardDecision::deny_to_login();
                };
                let user = self.session.merge_user(profile);
                self.session.log_in(user, &token);
            }
            Err(e) => {
                let rejected = e.kind() == ErrorKind::Authentication;
                tracing::warn!(error = %e, code = e.error_code(), rejected, policy = ?self.policy, "guard verification failed");
                if rejected && self.policy == StaleTokenPolicy::Clear {
                    self.session.log_out();
                }
            }
        }
        decision
    }
}
