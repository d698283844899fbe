//! MDD client: a headless client for the MDD themes, articles and comments service.
//!
//! SYSTEM CONTEXT
//! ==============
//! A renderer (or the bundled CLI) drives the view-models in [`views`]. View-models
//! call the backend through [`api::MddApi`], update the [`session::SessionStore`]
//! or their own local state, and hand back the [`routes::Route`] to navigate to.
//! The [`guard`] gates protected routes and the bearer interceptor in
//! [`api::interceptor`] authenticates every request.
//!
//! OWNERSHIP
//! =========
//! The session store is the only component that touches the persisted token
//! slot ([`storage`]). Everything else reads the token through the store.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod listing;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiClient, MddApi};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorKind};
pub use guard::{GuardDecision, RouteGuard, StaleTokenPolicy};
pub use routes::{Route, Router};
pub use session::SessionStore;
pub use state::AppState;
