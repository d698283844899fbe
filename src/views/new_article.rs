//! Article authoring screen.

use std::sync::{Arc, Mutex};

use super::validation::ValidationErrors;
use super::{BusySlot, Next, ViewError, lock};
use crate::api::MddApi;
use crate::listing::dedupe;
use crate::models::{NewArticle, Theme, User};
use crate::routes::Route;

pub const ALERT_CREATE_FAILED: &str = "Could not publish the article. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArticleForm {
    pub title: String,
    pub content: String,
    pub theme_id: Option<i64>,
}

impl NewArticleForm {
    /// # Errors
    ///
    /// Returns every rule the form breaks.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        ValidationErrors::new()
            .required("title", &self.title)
            .present("theme", self.theme_id)
            .required("content", &self.content)
            .finish()
    }
}

pub struct NewArticleView {
    api: Arc<dyn MddApi>,
    themes: Vec<Theme>,
    current_user: Option<User>,
    pub form: NewArticleForm,
    on_error: Mutex<bool>,
    alert: Mutex<Option<&'static str>>,
    submitting: BusySlot<()>,
}

impl NewArticleView {
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>) -> Self {
        Self {
            api,
            themes: Vec::new(),
            current_user: None,
            form: NewArticleForm::default(),
            on_error: Mutex::new(false),
            alert: Mutex::new(None),
            submitting: BusySlot::default(),
        }
    }

    /// Themes offered in the picker.
    #[must_use]
    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    #[must_use]
    pub fn on_error(&self) -> bool {
        *lock(&self.on_error)
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    pub fn take_alert(&self) -> Option<&'static str> {
        lock(&self.alert).take()
    }

    /// Fetch the theme picker options and the author.
    ///
    /// # Errors
    ///
    /// Returns the first failing request.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        self.themes = dedupe(self.api.themes().await?);
        self.current_user = Some(self.api.me().await?);
        Ok(())
    }

    /// Publish the form. The form is left as typed; the caller leaves the
    /// screen on success.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] before any request, [`ViewError::Busy`] while a
    /// submit is running; backend failures set `on_error` and raise an alert.
    pub async fn submit(&self) -> Result<Next, ViewError> {
        self.form.validate()?;
        let _busy = self.submitting.try_acquire(()).ok_or(ViewError::Busy)?;
        *lock(&self.on_error) = false;

        let article = NewArticle {
            title: self.form.title.trim().to_owned(),
            content: self.form.content.clone(),
            theme_id: self.form.theme_id.unwrap_or_default(),
            author_id: self.current_user.as_ref().map(|u| u.id),
        };
        match self.api.create_article(&article).await {
            Ok(()) => {
                tracing::info!(theme_id = article.theme_id, "article published");
                Ok(Next::Navigate(Route::Articles))
            }
            Err(e) => {
                tracing::warn!(error = %e, code = e.error_code(), "article publish failed");
                *lock(&self.on_error) = true;
                *lock(&self.alert) = Some(ALERT_CREATE_FAILED);
                Err(e.into())
            }
        }
    }
}
