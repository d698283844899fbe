//! Bearer token interceptor.
//!
//! Every outgoing request passes through [`BearerInterceptor::intercept`]. When
//! the token source holds a non-empty token the request gains
//! `Authorization: Bearer <token>`; otherwise it is passed through untouched.
//! No retry or refresh happens here.

use std::sync::Arc;

use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use crate::error::ApiError;

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod interceptor_test;

/// Read access to the current bearer token.
///
/// Implemented by [`crate::session::SessionStore`]; the interceptor never reads
/// storage directly.
pub trait TokenSource: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Clone)]
pub struct BearerInterceptor {
    tokens: Arc<dyn TokenSource>,
}

impl BearerInterceptor {
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self { tokens }
    }

    /// The `Authorization` value to attach, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidHeader`] when the token contains bytes that
    /// cannot appear in a header.
    pub fn authorization(&self) -> Result<Option<HeaderValue>, ApiError> {
        match self.tokens.bearer_token() {
            Some(token) if !token.is_empty() => bearer_header_value(&token).map(Some),
            _ => Ok(None),
        }
    }

    /// Attach the bearer header to `request` when a token is held.
    ///
    /// # Errors
    ///
    /// See [`BearerInterceptor::authorization`].
    pub fn intercept(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        Ok(match self.authorization()? {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        })
    }
}

/// Build a sensitive `Bearer <token>` header value.
///
/// # Errors
///
/// Returns [`ApiError::InvalidHeader`] for tokens with control characters.
pub fn bearer_header_value(token: &str) -> Result<HeaderValue, ApiError> {
    let mut value =
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}
