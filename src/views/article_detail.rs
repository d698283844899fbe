//! Single article with its comments.
//!
//! Loading resolves the article, its comments (newest first) and each comment
//! author. Any of those failing sends the user to the not-found screen.

use std::collections::HashMap;
use std::sync::Arc;

use super::validation::ValidationErrors;
use super::{Next, ViewError};
use crate::api::MddApi;
use crate::error::ApiError;
use crate::listing::{SortOrder, dedupe, sort_by_created};
use crate::models::{Article, Comment, User};
use crate::routes::Route;

#[cfg(test)]
#[path = "article_detail_test.rs"]
mod tests;

pub const ALERT_COMMENT_FAILED: &str = "Could not post your comment. Please try again.";

/// A comment paired with its resolved author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: Option<User>,
}

pub struct ArticleDetailView {
    api: Arc<dyn MddApi>,
    article_id: i64,
    article: Option<Article>,
    comments: Vec<CommentEntry>,
    pub comment_draft: String,
    alert: Option<&'static str>,
}

impl ArticleDetailView {
    #[must_use]
    pub fn new(api: Arc<dyn MddApi>, article_id: i64) -> Self {
        Self { api, article_id, article: None, comments: Vec::new(), comment_draft: String::new(), alert: None }
    }

    #[must_use]
    pub fn article_id(&self) -> i64 {
        self.article_id
    }

    #[must_use]
    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    #[must_use]
    pub fn comments(&self) -> &[CommentEntry] {
        &self.comments
    }

    pub fn take_alert(&mut self) -> Option<&'static str> {
        self.alert.take()
    }

    /// Load everything the screen shows. Returns where to go next: stay on
    /// success, the not-found screen on any failure.
    pub async fn load(&mut self) -> Next {
        match self.fetch().await {
            Ok((article, comments)) => {
                tracing::debug!(article_id = self.article_id, comments = comments.len(), "article loaded");
                self.article = Some(article);
                self.comments = comments;
                Next::Stay
            }
            Err(e) => {
                tracing::warn!(article_id = self.article_id, error = %e, code = e.error_code(), "article load failed");
                Next::Navigate(Route::NotFound)
            }
        }
    }

    async fn fetch(&self) -> Result<(Article, Vec<CommentEntry>), ApiError> {
        let article = self.api.article(self.article_id).await?;

        let mut comments = dedupe(self.api.comments(self.article_id).await?);
        sort_by_created(&mut comments, SortOrder::Desc);

        let mut authors: HashMap<i64, User> = HashMap::new();
        let mut entries = Vec::with_capacity(comments.len());
        for comment in comments {
            let author = match comment.author_id {
                Some(id) => Some(match authors.get(&id) {
                    Some(user) => user.clone(),
                    None => {
                        let user = self.api.user(id).await?;
                        authors.insert(id, user.clone());
                        user
                    }
                }),
                None => None,
            };
            entries.push(CommentEntry { comment, author });
        }
        Ok((article, entries))
    }

    /// Post the draft as a comment, then reload the article.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] for a blank draft; backend failures raise an alert
    /// and keep the draft.
    pub async fn add_comment(&mut self) -> Result<Next, ViewError> {
        ValidationErrors::new().required("content", &self.comment_draft).finish()?;

        if let Err(e) = self.api.add_comment(self.article_id, &self.comment_draft).await {
            tracing::warn!(article_id = self.article_id, error = %e, "comment post failed");
            self.alert = Some(ALERT_COMMENT_FAILED);
            return Err(e.into());
        }
        tracing::info!(article_id = self.article_id, "comment posted");
        self.comment_draft.clear();
        Ok(self.load().await)
    }
}
