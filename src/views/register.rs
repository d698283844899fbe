//! Account creation screen.

use std::sync::{Arc, Mutex};

use super::validation::ValidationErrors;
use super::{BusySlot, Next, ViewError, lock};
use crate::api::MddApi;
use crate::models::RegisterRequest;
use crate::routes::Route;
use crate::session::SessionStore;

pub const NAME_MIN_LEN: usize = 3;
pub const PASSWORD_MIN_LEN: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns every rule the form breaks.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        ValidationErrors::new()
            .email("email", &self.email)
            .min_length("name", &self.name, NAME_MIN_LEN)
            .min_length("password", &self.password, PASSWORD_MIN_LEN)
            .finish()
    }
}

pub struct RegisterView {
    api: Arc<dyn MddApi>,
    session: Arc<SessionStore>,
    pub form: RegisterForm,
    pub hide_password: bool,
    on_error: Mutex<bool>,
    submitting: BusySlot<()>,
}

impl RegisterView {
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            form: RegisterForm::default(),
            hide_password: true,
            on_error: Mutex::new(false),
            submitting: BusySlot::default(),
        }
    }

    #[must_use]
    pub fn on_error(&self) -> bool {
        *lock(&self.on_error)
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    /// Register, adopt the issued token and continue to the article feed.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] before any request, [`ViewError::Busy`] while a
    /// submit is running, [`ViewError::Api`] for backend failures.
    pub async fn submit(&self) -> Result<Next, ViewError> {
        self.form.validate()?;
        let _busy = self.submitting.try_acquire(()).ok_or(ViewError::Busy)?;
        *lock(&self.on_error) = false;

        let request = RegisterRequest {
            email: self.form.email.trim().to_owned(),
            name: self.form.name.trim().to_owned(),
            password: self.form.password.clone(),
        };
        let result = match self.api.register(&request).await {
            Ok(auth) => self.session.sign_in(self.api.as_ref(), &auth.token).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "registration succeeded");
                Ok(Next::Navigate(Route::Articles))
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "registration failed");
                *lock(&self.on_error) = true;
                Err(e.into())
            }
        }
    }
}
