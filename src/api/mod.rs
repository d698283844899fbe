//! Backend API access.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`MddApi`] is the seam every view-model, the session store and the guard
//! depend on. [`ApiClient`] is the HTTP implementation; tests substitute fakes.
//! `endpoints` owns the path table and `interceptor` the bearer header.

pub mod client;
pub mod endpoints;
pub mod interceptor;

pub use client::ApiClient;
pub use interceptor::{BearerInterceptor, TokenSource};

use crate::error::ApiError;
use crate::models::{Article, AuthSuccess, Comment, LoginRequest, NewArticle, RegisterRequest, Theme, User, UserUpdate};

/// Every backend operation the client uses, one method per endpoint.
#[async_trait::async_trait]
pub trait MddApi: Send + Sync {
    /// `POST /api/auth/register`
    async fn register(&self, request: &RegisterRequest) -> Result<AuthSuccess, ApiError>;

    /// `POST /api/auth/login`
    async fn login(&self, request: &LoginRequest) -> Result<AuthSuccess, ApiError>;

    /// `GET /api/auth/me`, requires the bearer token.
    async fn me(&self) -> Result<User, ApiError>;

    /// `GET /api/theme/`
    async fn themes(&self) -> Result<Vec<Theme>, ApiError>;

    /// `GET /api/theme/follow/:id`
    async fn follow_theme(&self, theme_id: i64) -> Result<(), ApiError>;

    /// `GET /api/theme/unfollow/:id`
    async fn unfollow_theme(&self, theme_id: i64) -> Result<(), ApiError>;

    /// `GET /api/articles/followed`
    async fn followed_articles(&self) -> Result<Vec<Article>, ApiError>;

    /// `GET /api/articles/:id`
    async fn article(&self, article_id: i64) -> Result<Article, ApiError>;

    /// `POST /api/articles/add`
    async fn create_article(&self, article: &NewArticle) -> Result<(), ApiError>;

    /// `GET /api/comments/:id`
    async fn comments(&self, article_id: i64) -> Result<Vec<Comment>, ApiError>;

    /// `POST /api/comments/add/:id` with the raw comment text as body.
    async fn add_comment(&self, article_id: i64, content: &str) -> Result<(), ApiError>;

    /// `GET /api/user/:id`
    async fn user(&self, user_id: i64) -> Result<User, ApiError>;

    /// `PUT /api/user/update`
    async fn update_user(&self, update: &UserUpdate) -> Result<(), ApiError>;
}
