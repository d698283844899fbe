//! HTTP implementation of [`MddApi`] over `reqwest`.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures become [`ApiError::Unreachable`]; non-success statuses are
//! classified by [`ApiError::from_status`]. Mutation endpoints ignore the response
//! body, read endpoints decode it through [`unwrap_envelope`].

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::endpoints;
use super::interceptor::{BearerInterceptor, TokenSource};
use super::MddApi;
use crate::config::{ClientConfig, Timeouts};
use crate::error::ApiError;
use crate::models::{
    Article, AuthSuccess, Comment, LoginRequest, NewArticle, RegisterRequest, Theme, User, UserUpdate,
    unwrap_envelope,
};

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

enum Body {
    Empty,
    Json(Value),
    Text(String),
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    interceptor: BearerInterceptor,
}

impl ApiClient {
    /// Build a client for `base_url` whose requests carry the token from `tokens`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: Timeouts, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            interceptor: BearerInterceptor::new(tokens),
        })
    }

    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.timeouts, tokens)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, method: Method, path: &str, body: Body) -> Result<String, ApiError> {
        let builder = self.http.request(method.clone(), self.url(path));
        let builder = match body {
            Body::Empty => builder,
            Body::Json(json) => builder.json(&json),
            Body::Text(text) => builder.header(CONTENT_TYPE, "text/plain").body(text),
        };
        let builder = self.interceptor.intercept(builder)?;

        let response = builder.send().await.map_err(|e| {
            let err = ApiError::from_transport(&e);
            tracing::warn!(%method, path, error = %err, "api request failed");
            err
        })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::from_transport(&e))?;
        tracing::debug!(%method, path, status, "api response");

        if !response_ok(status) {
            return Err(ApiError::from_status(status, path, text));
        }
        Ok(text)
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str, envelope_key: &str) -> Result<T, ApiError> {
        let text = self.send(Method::GET, path, Body::Empty).await?;
        decode(&text, envelope_key)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        envelope_key: &str,
    ) -> Result<T, ApiError> {
        let text = self.send(Method::POST, path, Body::Json(to_json(body)?)).await?;
        decode(&text, envelope_key)
    }

    async fn execute(&self, method: Method, path: &str, body: Body) -> Result<(), ApiError> {
        self.send(method, path, body).await.map(|_| ())
    }
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}

fn to_json<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) fn parse_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(text: &str, envelope_key: &str) -> Result<T, ApiError> {
    let value = parse_body(text)?;
    unwrap_envelope(value, envelope_key).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl MddApi for ApiClient {
    // =========================================================================
    // AUTH
    // =========================================================================

    async fn register(&self, request: &RegisterRequest) -> Result<AuthSuccess, ApiError> {
        self.post_json(endpoints::REGISTER, request, "auth").await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthSuccess, ApiError> {
        self.post_json(endpoints::LOGIN, request, "auth").await
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.fetch(endpoints::ME, "user").await
    }

    // =========================================================================
    // THEMES
    // =========================================================================

    async fn themes(&self) -> Result<Vec<Theme>, ApiError> {
        self.fetch(endpoints::THEMES, "themes").await
    }

    async fn follow_theme(&self, theme_id: i64) -> Result<(), ApiError> {
        self.execute(Method::GET, &endpoints::follow_theme(theme_id), Body::Empty).await
    }

    async fn unfollow_theme(&self, theme_id: i64) -> Result<(), ApiError> {
        self.execute(Method::GET, &endpoints::unfollow_theme(theme_id), Body::Empty).await
    }

    // =========================================================================
    // ARTICLES
    // =========================================================================

    async fn followed_articles(&self) -> Result<Vec<Article>, ApiError> {
        self.fetch(endpoints::FOLLOWED_ARTICLES, "articles").await
    }

    async fn article(&self, article_id: i64) -> Result<Article, ApiError> {
        self.fetch(&endpoints::article(article_id), "article").await
    }

    async fn create_article(&self, article: &NewArticle) -> Result<(), ApiError> {
        self.execute(Method::POST, endpoints::ADD_ARTICLE, Body::Json(to_json(article)?)).await
    }

    // =========================================================================
    // COMMENTS
    // =========================================================================

    async fn comments(&self, article_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.fetch(&endpoints::comments(article_id), "comments").await
    }

    async fn add_comment(&self, article_id: i64, content: &str) -> Result<(), ApiError> {
        self.execute(Method::POST, &endpoints::add_comment(article_id), Body::Text(content.to_owned()))
            .await
    }

    // =========================================================================
    // USERS
    // =========================================================================

    async fn user(&self, user_id: i64) -> Result<User, ApiError> {
        self.fetch(&endpoints::user(user_id), "user").await
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<(), ApiError> {
        self.execute(Method::PUT, endpoints::UPDATE_USER, Body::Json(to_json(update)?)).await
    }
}
