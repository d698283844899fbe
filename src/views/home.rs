//! Landing screen: only needs to know whether to offer login/register links.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;

use crate::session::SessionStore;

pub struct HomeView {
    session: Arc<SessionStore>,
}

impl HomeView {
    #[must_use]
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn is_logged(&self) -> BoxStream<'static, bool> {
        self.session.is_logged_stream()
    }

    #[must_use]
    pub fn not_logged(&self) -> BoxStream<'static, bool> {
        self.session.is_logged_stream().map(|logged| !logged).boxed()
    }
}
