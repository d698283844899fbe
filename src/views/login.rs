//! Login screen.
//!
//! Submit runs login, then [`SessionStore::sign_in`] with the issued token so the
//! profile request is authenticated, then sends the user to the article feed.
//! Any failure clears the token and sets a message matching the failure kind.

use std::sync::{Arc, Mutex};

use super::validation::ValidationErrors;
use super::{BusySlot, Next, ViewError, lock};
use crate::api::MddApi;
use crate::error::ApiError;
use crate::models::{LoginRequest, User};
use crate::routes::Route;
use crate::session::SessionStore;

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;

pub const PASSWORD_MIN_LEN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every rule the form breaks.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        ValidationErrors::new()
            .required("email", &self.email)
            .min_length("password", &self.password, PASSWORD_MIN_LEN)
            .finish()
    }
}

pub struct LoginView {
    api: Arc<dyn MddApi>,
    session: Arc<SessionStore>,
    pub form: LoginForm,
    pub hide_password: bool,
    error_message: Mutex<Option<&'static str>>,
    loading: BusySlot<()>,
}

impl LoginView {
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            form: LoginForm::default(),
            hide_password: true,
            error_message: Mutex::new(None),
            loading: BusySlot::default(),
        }
    }

    /// A held token skips the form entirely.
    #[must_use]
    pub fn open(&self) -> Next {
        if self.session.has_token() { Next::Navigate(Route::Articles) } else { Next::Stay }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        *lock(&self.error_message)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.is_busy()
    }

    /// Takes `&self` so a renderer can poll [`LoginView::is_loading`] while the
    /// submit is pending; a second submit in that window is refused.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] before any request, [`ViewError::Busy`] while a
    /// submit is running, [`ViewError::Api`] for backend failures.
    pub async fn submit(&self) -> Result<Next, ViewError> {
        self.form.validate()?;
        let _busy = self.loading.try_acquire(()).ok_or(ViewError::Busy)?;
        *lock(&self.error_message) = None;

        match self.authenticate().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "login succeeded");
                Ok(Next::Navigate(Route::Articles))
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "login failed");
                *lock(&self.error_message) = Some(e.user_message());
                self.session.log_out();
                Err(e.into())
            }
        }
    }

    async fn authenticate(&self) -> Result<User, ApiError> {
        let request = LoginRequest { email: self.form.email.trim().to_owned(), password: self.form.password.clone() };
        let auth = self.api.login(&request).await?;
        self.session.sign_in(self.api.as_ref(), &auth.token).await
    }
}
