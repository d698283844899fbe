//! Site header: login state, logout and the mobile menu.
//!
//! The header listens for [`NavigationEnd`] while it exists and closes the
//! mobile menu on each one. Dropping the header drops the subscription.

use std::sync::Arc;

use futures::stream::BoxStream;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use super::Next;
use crate::routes::{NavigationEnd, Route, Router};
use crate::session::SessionStore;

/// Viewport width at which the mobile menu no longer applies.
pub const MOBILE_BREAKPOINT_PX: u32 = 600;

pub struct HeaderView {
    session: Arc<SessionStore>,
    navigation: broadcast::Receiver<NavigationEnd>,
    mobile_menu_open: bool,
}

impl HeaderView {
    #[must_use]
    pub fn new(session: Arc<SessionStore>, router: &Router) -> Self {
        Self { session, navigation: router.subscribe(), mobile_menu_open: false }
    }

    #[must_use]
    pub fn is_logged(&self) -> BoxStream<'static, bool> {
        self.session.is_logged_stream()
    }

    /// Current menu state after applying any navigation that happened since
    /// the last call.
    pub fn mobile_menu_open(&mut self) -> bool {
        self.drain_navigation();
        self.mobile_menu_open
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.drain_navigation();
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    pub fn close_mobile_menu(&mut self) {
        self.mobile_menu_open = false;
    }

    pub fn on_resize(&mut self, width_px: u32) {
        if width_px >= MOBILE_BREAKPOINT_PX && self.mobile_menu_open {
            self.mobile_menu_open = false;
        }
    }

    /// End the session and go home.
    pub fn logout(&mut self) -> Next {
        self.session.log_out();
        self.mobile_menu_open = false;
        Next::Navigate(Route::Home)
    }

    fn drain_navigation(&mut self) {
        loop {
            match self.navigation.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => self.mobile_menu_open = false,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::guard::RouteGuard;
    use crate::storage::MemoryTokenStorage;
    use crate::test_support::{FakeApi, user};

    fn setup() -> (Arc<SessionStore>, Router) {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStorage::new())));
        let guard = RouteGuard::new(session.clone(), Duration::from_secs(5));
        let router = Router::new(Arc::new(FakeApi::new()), guard);
        (session, router)
    }

    #[tokio::test]
    async fn navigation_closes_mobile_menu() {
        let (session, router) = setup();
        let mut header = HeaderView::new(session, &router);

        header.toggle_mobile_menu();
        assert!(header.mobile_menu_open());

        router.navigate("/register").await;
        assert!(!header.mobile_menu_open());
    }

    #[test]
    fn toggle_and_close() {
        let (session, router) = setup();
        let mut header = HeaderView::new(session, &router);
        header.toggle_mobile_menu();
        header.toggle_mobile_menu();
        assert!(!header.mobile_menu_open());
        header.toggle_mobile_menu();
        header.close_mobile_menu();
        assert!(!header.mobile_menu_open());
    }

    #[test]
    fn wide_viewport_closes_menu() {
        let (session, router) = setup();
        let mut header = HeaderView::new(session, &router);
        header.toggle_mobile_menu();

        header.on_resize(599);
        assert!(header.mobile_menu_open());
        header.on_resize(600);
        assert!(!header.mobile_menu_open());
    }

    #[test]
    fn logout_ends_session_and_goes_home() {
        let (session, router) = setup();
        session.log_in(user(1, "ada"), "abc");
        let mut header = HeaderView::new(session.clone(), &router);

        assert_eq!(header.logout(), Next::Navigate(Route::Home));
        assert!(!session.is_logged_in());
        assert!(!session.has_token());
    }
}
