//! Backend paths, one function per endpoint.

pub const REGISTER: &str = "/api/auth/register";
pub const LOGIN: &str = "/api/auth/login";
pub const ME: &str = "/api/auth/me";
pub const THEMES: &str = "/api/theme/";
pub const FOLLOWED_ARTICLES: &str = "/api/articles/followed";
pub const ADD_ARTICLE: &str = "/api/articles/add";
pub const UPDATE_USER: &str = "/api/user/update";

#[must_use]
pub fn follow_theme(theme_id: i64) -> String {
    format!("/api/theme/follow/{theme_id}")
}

#[must_use]
pub fn unfollow_theme(theme_id: i64) -> String {
    format!("/api/theme/unfollow/{theme_id}")
}

#[must_use]
pub fn article(article_id: i64) -> String {
    format!("/api/articles/{article_id}")
}

#[must_use]
pub fn comments(article_id: i64) -> String {
    format!("/api/comments/{article_id}")
}

#[must_use]
pub fn add_comment(article_id: i64) -> String {
    format!("/api/comments/add/{article_id}")
}

#[must_use]
pub fn user(user_id: i64) -> String {
    format!("/api/user/{user_id}")
}
