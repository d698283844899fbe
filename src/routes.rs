//! Route table and navigation through the guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! View-models return a [`Route`]; the renderer hands it (or a raw path) to
//! [`Router::navigate_to`] / [`Router::navigate`]. Protected routes pass through
//! the [`RouteGuard`] first, and every completed navigation is broadcast as a
//! [`NavigationEnd`] so the header can close its mobile menu.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::api::MddApi;
use crate::guard::{GuardDecision, RouteGuard};

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

const NAVIGATION_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    Profile,
    Articles,
    ArticleDetail(i64),
    Themes,
    NewArticle,
    NotFound,
}

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".into(),
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::Profile => "/profile".into(),
            Self::Articles => "/mdd/articles".into(),
            Self::ArticleDetail(id) => format!("/mdd/articles/{id}"),
            Self::Themes => "/mdd/themes".into(),
            Self::NewArticle => "/mdd/newArticle".into(),
            Self::NotFound => "/404".into(),
        }
    }

    /// Resolve a path. `/mdd` redirects to the article list; anything unknown,
    /// including a non-numeric article id, resolves to [`Route::NotFound`].
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["profile"] => Self::Profile,
            ["404"] => Self::NotFound,
            ["mdd"] | ["mdd", "articles"] => Self::Articles,
            ["mdd", "articles", id] => id.parse().map_or(Self::NotFound, Self::ArticleDetail),
            ["mdd", "themes"] => Self::Themes,
            ["mdd", "newArticle"] => Self::NewArticle,
            _ => Self::NotFound,
        }
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Profile | Self::Articles | Self::ArticleDetail(_) | Self::Themes | Self::NewArticle
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Emitted after every completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEnd {
    /// Route the caller asked for.
    pub requested: Route,
    /// Route actually reached after guard redirects.
    pub reached: Route,
}

pub struct Router {
    api: Arc<dyn MddApi>,
    guard: RouteGuard,
    current: Mutex<Route>,
    events: broadcast::Sender<NavigationEnd>,
}

impl Router {
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>, guard: RouteGuard) -> Self {
        let (events, _) = broadcast::channel(NAVIGATION_CHANNEL_CAPACITY);
        Self { api, guard, current: Mutex::new(Route::Home), events }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Receive a [`NavigationEnd`] for every navigation completed after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEnd> {
        self.events.subscribe()
    }

    /// Parse `path` and navigate to it.
    pub async fn navigate(&self, path: &str) -> Route {
        self.navigate_to(Route::parse(path)).await
    }

    /// Navigate to `route`, running the guard for protected routes. Returns the
    /// route actually reached.
    pub async fn navigate_to(&self, route: Route) -> Route {
        let reached = if route.requires_auth() {
            match self.guard.can_activate(self.api.as_ref()).await {
                GuardDecision::Allowed => route.clone(),
                GuardDecision::Denied { redirect } => {
                    tracing::info!(requested = %route, redirect = %redirect, "navigation redirected by guard");
                    redirect
                }
            }
        } else {
            route.clone()
        };

        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = reached.clone();
        tracing::debug!(route = %reached, "navigation end");
        // No subscribers is fine.
        let _ = self.events.send(NavigationEnd { requested: route, reached: reached.clone() });
        reached
    }
}
