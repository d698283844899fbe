//! Wire types shared by the API clients, the session store and the view-models.
//!
//! DESIGN
//! ======
//! The backend speaks camelCase JSON and is inconsistent about wrapping: the same
//! resource may arrive bare or inside `{"<name>": …}`. [`unwrap_envelope`] accepts
//! both so callers never care.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// A creation/update instant as sent by the backend: ISO text or epoch millis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl Timestamp {
    /// Epoch milliseconds, or `None` when the text is not a recognised date.
    #[must_use]
    pub fn epoch_millis(&self) -> Option<i64> {
        match self {
            Self::Millis(ms) => Some(*ms),
            Self::Text(raw) => parse_text_millis(raw.trim()),
        }
    }
}

impl From<&str> for Timestamp {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_owned())
    }
}

/// Sort key for an optional timestamp; missing or unparseable values are epoch zero.
#[must_use]
pub fn sort_millis(ts: Option<&Timestamp>) -> i64 {
    ts.and_then(Timestamp::epoch_millis).unwrap_or(0)
}

fn parse_text_millis(raw: &str) -> Option<i64> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    // Jackson's default `java.util.Date` rendering: 2024-01-01T10:00:00.000+0000
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

// =============================================================================
// RESOURCES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login name.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub followed_themes: Vec<Theme>,
}

impl User {
    #[must_use]
    pub fn followed_theme_ids(&self) -> BTreeSet<i64> {
        self.followed_themes.iter().filter_map(|t| t.id).collect()
    }

    #[must_use]
    pub fn follows(&self, theme_id: i64) -> bool {
        self.followed_themes.iter().any(|t| t.id == Some(theme_id))
    }

    /// Overlay non-empty fields of `other` onto `self`.
    pub fn merge(&mut self, other: User) {
        self.id = other.id;
        if !other.name.is_empty() {
            self.name = other.name;
        }
        if !other.username.is_empty() {
            self.username = other.username;
        }
        if !other.email.is_empty() {
            self.email = other.email;
        }
        if !other.followed_themes.is_empty() {
            self.followed_themes = other.followed_themes;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub theme_id: Option<i64>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author_username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Option<i64>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

// =============================================================================
// REQUEST / RESPONSE BODIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Body returned by login and register.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSuccess {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub theme_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
    /// Left out of the body when the user did not type a new password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

// =============================================================================
// ENVELOPES
// =============================================================================

/// Decode `value` either as `T` directly or from `value[key]`.
///
/// # Errors
///
/// Returns the serde error from decoding the selected value.
pub fn unwrap_envelope<T: DeserializeOwned>(mut value: Value, key: &str) -> Result<T, serde_json::Error> {
    if let Some(map) = value.as_object_mut() {
        if let Some(inner) = map.remove(key) {
            return serde_json::from_value(inner);
        }
    }
    serde_json::from_value(value)
}
