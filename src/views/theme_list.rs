//! Theme catalogue with a follow toggle per theme.
//!
//! Follow state is changed only after the backend confirms, so a failed toggle
//! leaves the screen exactly as it was.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use super::{BusySlot, ViewError, lock};
use crate::api::MddApi;
use crate::listing::dedupe;
use crate::models::Theme;

#[cfg(test)]
#[path = "theme_list_test.rs"]
mod tests;

pub const ALERT_FOLLOW_FAILED: &str = "Could not update the subscription. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeItem {
    pub theme: Theme,
    pub followed: bool,
}

impl ThemeItem {
    #[must_use]
    pub fn new(theme: Theme, followed_ids: &BTreeSet<i64>) -> Self {
        let followed = theme.id.is_some_and(|id| followed_ids.contains(&id));
        Self { theme, followed }
    }

    /// Label for the toggle button.
    #[must_use]
    pub fn action_label(&self) -> &'static str {
        if self.followed { "Unsubscribe" } else { "Subscribe" }
    }
}

pub struct ThemeListView {
    api: Arc<dyn MddApi>,
    items: Mutex<Vec<ThemeItem>>,
    alert: Mutex<Option<&'static str>>,
    pending: BusySlot<i64>,
}

impl ThemeListView {
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>) -> Self {
        Self { api, items: Mutex::new(Vec::new()), alert: Mutex::new(None), pending: BusySlot::default() }
    }

    #[must_use]
    pub fn items(&self) -> Vec<ThemeItem> {
        lock(&self.items).clone()
    }

    pub fn take_alert(&self) -> Option<&'static str> {
        lock(&self.alert).take()
    }

    /// Theme whose toggle is running.
    #[must_use]
    pub fn pending_id(&self) -> Option<i64> {
        self.pending.current()
    }

    /// Fetch the catalogue and mark the themes the current user follows.
    ///
    /// A failed "who am I" still shows the catalogue, with nothing marked
    /// followed.
    ///
    /// # Errors
    ///
    /// Returns the catalogue request error; the previous list is kept.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let themes = self.api.themes().await?;
        let followed_ids = match self.api.me().await {
            Ok(me) => me.followed_theme_ids(),
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "follow state unavailable; showing catalogue only");
                BTreeSet::new()
            }
        };
        self.set_themes(themes, &followed_ids);
        Ok(())
    }

    /// Replace the list, deduplicating by id then slug then name.
    pub fn set_themes(&mut self, themes: Vec<Theme>, followed_ids: &BTreeSet<i64>) {
        let items = self.items.get_mut().unwrap_or_else(PoisonError::into_inner);
        *items = dedupe(themes).into_iter().map(|t| ThemeItem::new(t, followed_ids)).collect();
        tracing::debug!(count = items.len(), followed = followed_ids.len(), "theme list updated");
    }

    /// Record that `theme_id` is now (un)followed.
    pub fn on_theme_changed(&self, theme_id: i64, followed: bool) {
        for item in lock(&self.items).iter_mut().filter(|i| i.theme.id == Some(theme_id)) {
            item.followed = followed;
        }
    }

    /// Follow `theme_id` if it is not followed, unfollow it otherwise. Returns
    /// the new follow state.
    ///
    /// Takes `&self` so the renderer can read [`ThemeListView::pending_id`]
    /// while the request runs.
    ///
    /// # Errors
    ///
    /// [`ViewError::UnknownItem`] for a theme not on screen, [`ViewError::Busy`]
    /// while another toggle runs; backend failures raise an alert.
    pub async fn change_follow(&self, theme_id: i64) -> Result<bool, ViewError> {
        let was_followed = lock(&self.items)
            .iter()
            .find(|i| i.theme.id == Some(theme_id))
            .map(|i| i.followed)
            .ok_or(ViewError::UnknownItem(theme_id))?;
        let _busy = self.pending.try_acquire(theme_id).ok_or(ViewError::Busy)?;

        let result = if was_followed {
            self.api.unfollow_theme(theme_id).await
        } else {
            self.api.follow_theme(theme_id).await
        };
        if let Err(e) = result {
            tracing::warn!(theme_id, error = %e, code = e.error_code(), "follow toggle failed");
            *lock(&self.alert) = Some(ALERT_FOLLOW_FAILED);
            return Err(e.into());
        }

        let followed = !was_followed;
        self.on_theme_changed(theme_id, followed);
        tracing::info!(theme_id, followed, "follow state changed");
        Ok(followed)
    }
}
