//! Profile screen: account form plus the list of followed themes.
//!
//! Followed themes always come from a fresh "who am I" so the list reflects
//! the backend after every unfollow. Only one unfollow runs at a time.

use std::sync::{Arc, Mutex};

use super::validation::ValidationErrors;
use super::{BusySlot, Next, ViewError, lock};
use crate::api::MddApi;
use crate::listing::dedupe;
use crate::models::{Theme, User, UserUpdate};
use crate::session::SessionStore;

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;

pub const ALERT_UNFOLLOW_FAILED: &str = "Could not unfollow the theme. Please try again.";
pub const ALERT_UPDATE_FAILED: &str = "Could not save your profile. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub username: String,
    pub email: String,
    /// Left empty to keep the current password.
    pub password: String,
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns every rule the form breaks.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        ValidationErrors::new().required("username", &self.username).email("email", &self.email).finish()
    }

    fn fill_from(&mut self, user: &User) {
        self.username.clone_from(&user.username);
        self.email.clone_from(&user.email);
        self.password.clear();
    }
}

pub struct ProfileView {
    api: Arc<dyn MddApi>,
    session: Arc<SessionStore>,
    pub form: ProfileForm,
    followed_themes: Mutex<Vec<Theme>>,
    on_error: Mutex<bool>,
    alert: Mutex<Option<&'static str>>,
    unfollowing: BusySlot<i64>,
}

impl ProfileView {
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            form: ProfileForm::default(),
            followed_themes: Mutex::new(Vec::new()),
            on_error: Mutex::new(false),
            alert: Mutex::new(None),
            unfollowing: BusySlot::default(),
        }
    }

    #[must_use]
    pub fn followed_themes(&self) -> Vec<Theme> {
        lock(&self.followed_themes).clone()
    }

    #[must_use]
    pub fn on_error(&self) -> bool {
        *lock(&self.on_error)
    }

    /// Transient alert for the renderer; reading it clears it.
    pub fn take_alert(&self) -> Option<&'static str> {
        lock(&self.alert).take()
    }

    /// Theme whose unfollow is running, used to disable its button.
    #[must_use]
    pub fn unfollowing_id(&self) -> Option<i64> {
        self.unfollowing.current()
    }

    /// Fill the form and the followed list from the current profile.
    ///
    /// # Errors
    ///
    /// Returns the profile request error and sets `on_error`.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        *lock(&self.on_error) = false;
        match self.api.me().await {
            Ok(user) => {
                self.form.fill_from(&user);
                *lock(&self.followed_themes) = dedupe(user.followed_themes.clone());
                self.session.merge_user(user);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "profile load failed");
                *lock(&self.on_error) = true;
                Err(e.into())
            }
        }
    }

    /// Unfollow `theme_id`, then reload the followed list. Takes `&self` so the
    /// renderer can read [`ProfileView::unfollowing_id`] while it runs.
    ///
    /// # Errors
    ///
    /// [`ViewError::Busy`] while another unfollow runs; backend failures raise
    /// an alert and leave the list unchanged.
    pub async fn unfollow(&self, theme_id: i64) -> Result<(), ViewError> {
        let _busy = self.unfollowing.try_acquire(theme_id).ok_or(ViewError::Busy)?;

        let refreshed = match self.api.unfollow_theme(theme_id).await {
            Ok(()) => self.api.me().await,
            Err(e) => Err(e),
        };
        match refreshed {
            Ok(user) => {
                tracing::info!(theme_id, "theme unfollowed");
                *lock(&self.followed_themes) = dedupe(user.followed_themes.clone());
                self.session.merge_user(user);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, theme_id, "unfollow failed");
                *lock(&self.alert) = Some(ALERT_UNFOLLOW_FAILED);
                Err(e.into())
            }
        }
    }

    /// Save username, email and (when typed) a new password.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] before any request; backend failures set
    /// `on_error` and raise an alert.
    pub async fn submit(&mut self) -> Result<Next, ViewError> {
        *lock(&self.on_error) = false;
        self.form.validate()?;

        let password = Some(self.form.password.clone()).filter(|p| !p.is_empty());
        let update = UserUpdate {
            username: self.form.username.trim().to_owned(),
            email: self.form.email.trim().to_owned(),
            password,
        };
        if let Err(e) = self.api.update_user(&update).await {
            tracing::warn!(error = %e, code = e.error_code(), "profile update failed");
            *lock(&self.on_error) = true;
            *lock(&self.alert) = Some(ALERT_UPDATE_FAILED);
            return Err(e.into());
        }

        if let Some(current) = self.session.current_user() {
            self.session.merge_user(User {
                id: current.id,
                username: update.username,
                email: update.email,
                ..User::default()
            });
        }
        self.form.password.clear();
        tracing::info!("profile updated");
        Ok(Next::Stay)
    }
}
