//! Headless view-models, one per screen.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each view-model owns the state a renderer binds to (form fields, loaded
//! lists, error flags, transient alerts) and exposes the screen's actions as
//! async methods. Actions never navigate themselves: they return [`Next`] and
//! the caller hands any route to [`crate::routes::Router`].
//!
//! ERROR HANDLING
//! ==============
//! Actions return [`ViewError`]. Form problems are caught before any request
//! ([`ViewError::Invalid`]); backend failures are also mirrored into the view's
//! own state so a renderer can show them without inspecting the error.
//!
//! CONCURRENCY
//! ===========
//! Actions that must run one at a time (login, register, publish, follow
//! toggles, unfollow) take `&self` and claim a [`BusySlot`]. A second call made
//! while the first is pending gets [`ViewError::Busy`], and the renderer can
//! read the slot through the view's `is_*`/`*_id` accessors meanwhile. The
//! state these actions update sits behind short-lived mutexes.

pub mod article_detail;
pub mod article_list;
pub mod header;
pub mod home;
pub mod login;
pub mod new_article;
pub mod profile;
pub mod register;
pub mod theme_list;
pub mod validation;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use article_detail::ArticleDetailView;
pub use article_list::ArticleListView;
pub use header::HeaderView;
pub use home::HomeView;
pub use login::LoginView;
pub use new_article::NewArticleView;
pub use profile::ProfileView;
pub use register::RegisterView;
pub use theme_list::{ThemeItem, ThemeListView};
pub use validation::{FieldError, ValidationErrors};

use crate::error::ApiError;
use crate::routes::Route;

/// What the renderer should do once an action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Stay,
    Navigate(Route),
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("invalid form: {0}")]
    Invalid(ValidationErrors),
    #[error("another request is already in flight")]
    Busy,
    #[error("no item {0} on this screen")]
    UnknownItem(i64),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ViewError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(_) => "E_VALIDATION",
            Self::Busy => "E_BUSY",
            Self::UnknownItem(_) => "E_UNKNOWN_ITEM",
            Self::Api(e) => e.error_code(),
        }
    }
}

impl From<ValidationErrors> for ViewError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Invalid(errors)
    }
}

// =============================================================================
// IN-FLIGHT TRACKING
// =============================================================================

/// Lock view state that actions update through `&self`. Never held across an
/// await.
pub(crate) fn lock<T>(cell: &Mutex<T>) -> MutexGuard<'_, T> {
    cell.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks which request of a kind is running so a second one is refused.
///
/// The slot is released when the returned [`BusyGuard`] drops, including when
/// the action's future is dropped mid-flight.
#[derive(Debug, Clone)]
pub struct BusySlot<T: Copy> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T: Copy> Default for BusySlot<T> {
    fn default() -> Self {
        Self { slot: Arc::new(Mutex::new(None)) }
    }
}

impl<T: Copy> BusySlot<T> {
    /// The value of the running request, if any.
    #[must_use]
    pub fn current(&self) -> Option<T> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.current().is_some()
    }

    /// Claim the slot for `value`, or `None` when it is already taken.
    #[must_use]
    pub fn try_acquire(&self, value: T) -> Option<BusyGuard<T>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return None;
        }
        *slot = Some(value);
        Some(BusyGuard { slot: self.slot.clone() })
    }
}

pub struct BusyGuard<T: Copy> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T: Copy> Drop for BusyGuard<T> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_slot_refuses_second_claim_until_released() {
        let slot = BusySlot::<i64>::default();
        let guard = slot.try_acquire(3).unwrap();
        assert_eq!(slot.current(), Some(3));
        assert!(slot.try_acquire(4).is_none());
        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire(4).is_some());
    }

    #[test]
    fn view_error_codes_pass_through_api_errors() {
        let err = ViewError::from(ApiError::NotFound { path: "/api/articles/9".into() });
        assert_eq!(err.error_code(), "E_NOT_FOUND");
        assert_eq!(ViewError::Busy.error_code(), "E_BUSY");
    }
}
