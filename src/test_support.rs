//! In-process [`MddApi`] fake shared by unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::api::MddApi;
use crate::error::ApiError;
use crate::models::{
    Article, AuthSuccess, Comment, LoginRequest, NewArticle, RegisterRequest, Theme, User, UserUpdate,
};

#[derive(Default)]
struct FakeState {
    token: String,
    me: Option<User>,
    delays: HashMap<&'static str, Duration>,
    themes: Vec<Theme>,
    articles: Vec<Article>,
    comments: HashMap<i64, Vec<Comment>>,
    users: HashMap<i64, User>,
    failures: HashMap<&'static str, fn() -> ApiError>,
    calls: Vec<String>,
    logins: Vec<LoginRequest>,
    registrations: Vec<RegisterRequest>,
    created: Vec<NewArticle>,
    added_comments: Vec<(i64, String)>,
    updates: Vec<UserUpdate>,
}

/// Scriptable backend: canned data, per-operation failures and a call log.
#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<FakeState>,
}

pub(crate) fn unauthorized() -> ApiError {
    ApiError::Unauthorized { status: 403 }
}

pub(crate) fn unreachable() -> ApiError {
    ApiError::Unreachable("connection refused".into())
}

pub(crate) fn not_found() -> ApiError {
    ApiError::NotFound { path: "/api/test".into() }
}

pub(crate) fn server_error() -> ApiError {
    ApiError::Status { status: 500, body: "boom".into() }
}

pub(crate) fn user(id: i64, username: &str) -> User {
    User {
        id,
        name: username.to_uppercase(),
        username: username.to_owned(),
        email: format!("{username}@mdd.test"),
        followed_themes: Vec::new(),
    }
}

pub(crate) fn theme(id: i64, name: &str) -> Theme {
    Theme { id: Some(id), name: name.to_owned(), description: format!("about {name}"), slug: None }
}

pub(crate) fn article(id: i64, title: &str, created_at: &str) -> Article {
    Article {
        id: Some(id),
        title: title.to_owned(),
        theme_id: Some(1),
        content: format!("{title} body"),
        created_at: Some(created_at.into()),
        author_id: Some(1),
        author_username: "ada".into(),
        ..Article::default()
    }
}

pub(crate) fn comment(id: i64, author_id: i64, created_at: &str) -> Comment {
    Comment {
        id: Some(id),
        content: format!("comment {id}"),
        author_id: Some(author_id),
        created_at: Some(created_at.into()),
    }
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default().with_token("fake-token")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn with_token(self, token: &str) -> Self {
        self.lock().token = token.to_owned();
        self
    }

    pub(crate) fn with_me(self, user: User) -> Self {
        self.lock().users.insert(user.id, user.clone());
        self.lock().me = Some(user);
        self
    }

    pub(crate) fn with_me_delay(self, delay: Duration) -> Self {
        self.with_delay("me", delay)
    }

    /// Hold every `op` call for `delay` before it answers.
    pub(crate) fn with_delay(self, op: &'static str, delay: Duration) -> Self {
        self.lock().delays.insert(op, delay);
        self
    }

    pub(crate) fn with_themes(self, themes: Vec<Theme>) -> Self {
        self.lock().themes = themes;
        self
    }

    pub(crate) fn with_articles(self, articles: Vec<Article>) -> Self {
        self.lock().articles = articles;
        self
    }

    pub(crate) fn with_comments(self, article_id: i64, comments: Vec<Comment>) -> Self {
        self.lock().comments.insert(article_id, comments);
        self
    }

    pub(crate) fn with_user(self, user: User) -> Self {
        self.lock().users.insert(user.id, user);
        self
    }

    pub(crate) fn failing(self, op: &'static str, err: fn() -> ApiError) -> Self {
        self.fail(op, err);
        self
    }

    pub(crate) fn fail(&self, op: &'static str, err: fn() -> ApiError) {
        self.lock().failures.insert(op, err);
    }

    pub(crate) fn recover(&self, op: &'static str) {
        self.lock().failures.remove(op);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub(crate) fn count(&self, op: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.split(':').next() == Some(op)).count()
    }

    pub(crate) fn logins(&self) -> Vec<LoginRequest> {
        self.lock().logins.clone()
    }

    pub(crate) fn registrations(&self) -> Vec<RegisterRequest> {
        self.lock().registrations.clone()
    }

    pub(crate) fn created(&self) -> Vec<NewArticle> {
        self.lock().created.clone()
    }

    pub(crate) fn added_comments(&self) -> Vec<(i64, String)> {
        self.lock().added_comments.clone()
    }

    pub(crate) fn updates(&self) -> Vec<UserUpdate> {
        self.lock().updates.clone()
    }

    async fn pause(&self, op: &'static str) {
        let delay = self.lock().delays.get(op).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn enter(&self, op: &'static str, arg: Option<i64>) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push(match arg {
            Some(arg) => format!("{op}:{arg}"),
            None => op.to_owned(),
        });
        match state.failures.get(op) {
            Some(err) => Err(err()),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl MddApi for FakeApi {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthSuccess, ApiError> {
        self.pause("register").await;
        self.enter("register", None)?;
        let mut state = self.lock();
        state.registrations.push(request.clone());
        Ok(AuthSuccess { token: state.token.clone(), user: None })
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthSuccess, ApiError> {
        self.enter("login", None)?;
        let mut state = self.lock();
        state.logins.push(request.clone());
        Ok(AuthSuccess { token: state.token.clone(), user: None })
    }

    async fn me(&self) -> Result<User, ApiError> {
        self.pause("me").await;
        self.enter("me", None)?;
        self.lock().me.clone().ok_or(ApiError::Unauthorized { status: 401 })
    }

    async fn themes(&self) -> Result<Vec<Theme>, ApiError> {
        self.enter("themes", None)?;
        Ok(self.lock().themes.clone())
    }

    async fn follow_theme(&self, theme_id: i64) -> Result<(), ApiError> {
        self.pause("follow_theme").await;
        self.enter("follow_theme", Some(theme_id))?;
        let mut state = self.lock();
        let followed = state.themes.iter().find(|t| t.id == Some(theme_id)).cloned();
        if let (Some(me), Some(theme)) = (state.me.as_mut(), followed) {
            if !me.follows(theme_id) {
                me.followed_themes.push(theme);
            }
        }
        Ok(())
    }

    async fn unfollow_theme(&self, theme_id: i64) -> Result<(), ApiError> {
        self.pause("unfollow_theme").await;
        self.enter("unfollow_theme", Some(theme_id))?;
        if let Some(me) = self.lock().me.as_mut() {
            me.followed_themes.retain(|t| t.id != Some(theme_id));
        }
        Ok(())
    }

    async fn followed_articles(&self) -> Result<Vec<Article>, ApiError> {
        self.enter("followed_articles", None)?;
        Ok(self.lock().articles.clone())
    }

    async fn article(&self, article_id: i64) -> Result<Article, ApiError> {
        self.enter("article", Some(article_id))?;
        self.lock()
            .articles
            .iter()
            .find(|a| a.id == Some(article_id))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_article(&self, article: &NewArticle) -> Result<(), ApiError> {
        self.pause("create_article").await;
        self.enter("create_article", None)?;
        self.lock().created.push(article.clone());
        Ok(())
    }

    async fn comments(&self, article_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.enter("comments", Some(article_id))?;
        Ok(self.lock().comments.get(&article_id).cloned().unwrap_or_default())
    }

    async fn add_comment(&self, article_id: i64, content: &str) -> Result<(), ApiError> {
        self.enter("add_comment", Some(article_id))?;
        let mut state = self.lock();
        state.added_comments.push((article_id, content.to_owned()));
        let author_id = state.me.as_ref().map(|u| u.id);
        let next_id = i64::try_from(state.added_comments.len()).unwrap_or(0) + 1000;
        state.comments.entry(article_id).or_default().push(Comment {
            id: Some(next_id),
            content: content.to_owned(),
            author_id,
            created_at: Some("2030-01-01T00:00:00Z".into()),
        });
        Ok(())
    }

    async fn user(&self, user_id: i64) -> Result<User, ApiError> {
        self.enter("user", Some(user_id))?;
        self.lock().users.get(&user_id).cloned().ok_or_else(not_found)
    }

    async fn update_user(&self, update: &UserUpdate) -> Result<(), ApiError> {
        self.enter("update_user", None)?;
        let mut state = self.lock();
        state.updates.push(update.clone());
        if let Some(me) = state.me.as_mut() {
            me.username.clone_from(&update.username);
            me.email.clone_from(&update.email);
        }
        Ok(())
    }
}

/// Backend where only "who am I" is scripted; everything else fails.
pub(crate) struct MeHook<F>(pub F);

#[async_trait::async_trait]
impl<F> MddApi for MeHook<F>
where
    F: Fn() -> Result<User, ApiError> + Send + Sync,
{
    async fn register(&self, _request: &RegisterRequest) -> Result<AuthSuccess, ApiError> {
        Err(server_error())
    }

    async fn login(&self, _request: &LoginRequest) -> Result<AuthSuccess, ApiError> {
        Err(server_error())
    }

    async fn me(&self) -> Result<User, ApiError> {
        (self.0)()
    }

    async fn themes(&self) -> Result<Vec<Theme>, ApiError> {
        Err(server_error())
    }

    async fn follow_theme(&self, _theme_id: i64) -> Result<(), ApiError> {
        Err(server_error())
    }

    async fn unfollow_theme(&self, _theme_id: i64) -> Result<(), ApiError> {
        Err(server_error())
    }

    async fn followed_articles(&self) -> Result<Vec<Article>, ApiError> {
        Err(server_error())
    }

    async fn article(&self, _article_id: i64) -> Result<Article, ApiError> {
        Err(server_error())
    }

    async fn create_article(&self, _article: &NewArticle) -> Result<(), ApiError> {
        Err(server_error())
    }

    async fn comments(&self, _article_id: i64) -> Result<Vec<Comment>, ApiError> {
        Err(server_error())
    }

    async fn add_comment(&self, _article_id: i64, _content: &str) -> Result<(), ApiError> {
        Err(server_error())
    }

    async fn user(&self, _user_id: i64) -> Result<User, ApiError> {
        Err(server_error())
    }

    async fn update_user(&self, _update: &UserUpdate) -> Result<(), ApiError> {
        Err(server_error())
    }
}
