//! Feed of articles from followed themes.

use std::sync::Arc;

use super::ViewError;
use crate::api::MddApi;
use crate::listing::{SortOrder, dedupe, sorted_by_created};
use crate::models::Article;

pub struct ArticleListView {
    api: Arc<dyn MddApi>,
    source: Vec<Article>,
    articles: Vec<Article>,
    sort_order: SortOrder,
}

impl ArticleListView {
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>) -> Self {
        Self { api, source: Vec::new(), articles: Vec::new(), sort_order: SortOrder::default() }
    }

    /// Fetch, dedupe and sort the feed.
    ///
    /// # Errors
    ///
    /// Returns the request error; the previous list is kept.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let fetched = self.api.followed_articles().await.inspect_err(|e| {
            tracing::warn!(error = %e, code = e.error_code(), "article feed load failed");
        })?;
        self.set_articles(fetched);
        Ok(())
    }

    /// Replace the source list, as a pre-navigation resolver would.
    pub fn set_articles(&mut self, articles: Vec<Article>) {
        self.source = dedupe(articles);
        self.apply_sort();
        tracing::debug!(count = self.source.len(), "article feed updated");
    }

    pub fn toggle_sort_order(&mut self) {
        self.sort_order = self.sort_order.toggled();
        self.apply_sort();
    }

    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    #[must_use]
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    fn apply_sort(&mut self) {
        self.articles = sorted_by_created(&self.source, self.sort_order);
    }
}
