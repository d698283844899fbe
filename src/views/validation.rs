//! Form rules checked before any request is sent.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{0} must be a valid email address")]
    InvalidEmail(&'static str),
}

impl FieldError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required(field) | Self::InvalidEmail(field) | Self::TooShort { field, .. } => field,
        }
    }
}

/// Every rule a form broke, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Value is non-blank.
    pub fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(FieldError::Required(field));
        }
        self
    }

    /// Value is non-blank and at least `min` characters.
    pub fn min_length(&mut self, field: &'static str, value: &str, min: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(FieldError::Required(field));
        } else if value.chars().count() < min {
            self.0.push(FieldError::TooShort { field, min });
        }
        self
    }

    /// Value is non-blank and shaped like an email address.
    pub fn email(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(FieldError::Required(field));
        } else if !is_email(value) {
            self.0.push(FieldError::InvalidEmail(field));
        }
        self
    }

    /// Value is present.
    pub fn present<T>(&mut self, field: &'static str, value: Option<T>) -> &mut Self {
        if value.is_none() {
            self.0.push(FieldError::Required(field));
        }
        self
    }

    /// `Ok` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns the collected errors.
    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(std::mem::take(self)) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

/// `local@domain` with no whitespace and a domain that is not dot-delimited at
/// either end.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
