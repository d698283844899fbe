//! Duplicate removal and date ordering for backend lists.
//!
//! Backend lists may repeat items. [`dedupe`] keeps the first occurrence of each
//! key and preserves relative order; [`sort_by_created`] orders by creation
//! time, treating missing or unparseable timestamps as epoch zero. Both are pure,
//! so view-models keep the deduplicated source and re-sort on every toggle.

use std::collections::HashSet;
use std::fmt;

use crate::models::{Article, Comment, Theme, Timestamp, sort_millis};

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;

/// Identity used for duplicate detection. Variants never compare equal to each
/// other, so an id of `1` and a slug of `"1"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Id(i64),
    Slug(String),
    Composite(String),
}

pub trait Keyed {
    fn dedup_key(&self) -> DedupKey;
}

pub trait Dated {
    fn created_at(&self) -> Option<&Timestamp>;
}

impl Keyed for Article {
    /// id, else slug, else `title|createdAt`.
    fn dedup_key(&self) -> DedupKey {
        if let Some(id) = self.id {
            return DedupKey::Id(id);
        }
        if let Some(slug) = &self.slug {
            return DedupKey::Slug(slug.clone());
        }
        DedupKey::Composite(format!("{}|{}", self.title, raw_timestamp(self.created_at.as_ref())))
    }
}

impl Keyed for Theme {
    /// id, else slug, else name.
    fn dedup_key(&self) -> DedupKey {
        if let Some(id) = self.id {
            return DedupKey::Id(id);
        }
        if let Some(slug) = &self.slug {
            return DedupKey::Slug(slug.clone());
        }
        DedupKey::Composite(self.name.clone())
    }
}

impl Keyed for Comment {
    fn dedup_key(&self) -> DedupKey {
        match self.id {
            Some(id) => DedupKey::Id(id),
            None => DedupKey::Composite(format!(
                "{}|{}|{}",
                self.author_id.unwrap_or_default(),
                self.content,
                raw_timestamp(self.created_at.as_ref())
            )),
        }
    }
}

impl Dated for Article {
    fn created_at(&self) -> Option<&Timestamp> {
        self.created_at.as_ref()
    }
}

impl Dated for Comment {
    fn created_at(&self) -> Option<&Timestamp> {
        self.created_at.as_ref()
    }
}

fn raw_timestamp(ts: Option<&Timestamp>) -> String {
    match ts {
        Some(Timestamp::Text(raw)) => raw.clone(),
        Some(Timestamp::Millis(ms)) => ms.to_string(),
        None => String::new(),
    }
}

/// Keep the first item for every key, in original order.
#[must_use]
pub fn dedupe<T: Keyed>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items.into_iter().filter(|item| seen.insert(item.dedup_key())).collect()
}

// =============================================================================
// SORTING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable sort by creation time. Equal timestamps keep their relative order.
pub fn sort_by_created<T: Dated>(items: &mut [T], order: SortOrder) {
    match order {
        SortOrder::Asc => items.sort_by_key(|item| sort_millis(item.created_at())),
        SortOrder::Desc => items.sort_by(|a, b| sort_millis(b.created_at()).cmp(&sort_millis(a.created_at()))),
    }
}

/// Sorted copy of `items`.
#[must_use]
pub fn sorted_by_created<T: Dated + Clone>(items: &[T], order: SortOrder) -> Vec<T> {
    let mut out = items.to_vec();
    sort_by_created(&mut out, order);
    out
}
