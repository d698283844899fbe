use std::time::Duration;

use super::*;
use crate::storage::MemoryTokenStorage;
use crate::test_support::{FakeApi, server_error, theme, unreachable, user};

fn follower() -> User {
    User {
        followed_themes: vec![theme(1, "Rust"), theme(2, "Go"), theme(1, "Rust dup")],
        ..user(5, "linus")
    }
}

fn profile_view(api: &Arc<FakeApi>) -> (Arc<SessionStore>, ProfileView) {
    let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStorage::new())));
    session.log_in(user(5, "linus"), "abc");
    (session.clone(), ProfileView::new(api.clone(), session))
}

#[tokio::test]
async fn load_fills_form_and_dedupes_themes() {
    let api = Arc::new(FakeApi::new().with_me(follower()));
    let (_session, mut view) = profile_view(&api);
    view.form.password = "typed".into();

    view.load().await.unwrap();
    assert_eq!(view.form.username, "linus");
    assert_eq!(view.form.email, "linus@mdd.test");
    assert!(view.form.password.is_empty());
    let names: Vec<_> = view.followed_themes().into_iter().map(|t| t.name).collect();
    assert_eq!(names, ["Rust", "Go"]);
}

#[tokio::test]
async fn load_failure_sets_on_error() {
    let api = Arc::new(FakeApi::new().failing("me", unreachable));
    let (_session, mut view) = profile_view(&api);

    assert!(view.load().await.is_err());
    assert!(view.on_error());
}

#[tokio::test]
async fn unfollow_reloads_followed_list() {
    let api = Arc::new(FakeApi::new().with_me(follower()));
    let (_session, mut view) = profile_view(&api);
    view.load().await.unwrap();

    view.unfollow(1).await.unwrap();
    assert_eq!(api.count("unfollow_theme"), 1);
    assert_eq!(api.count("me"), 2);
    let ids: Vec<_> = view.followed_themes().iter().filter_map(|t| t.id).collect();
    assert_eq!(ids, [2]);
    assert!(view.unfollowing_id().is_none());
}

#[tokio::test]
async fn second_unfollow_is_refused_while_one_runs() {
    let api = Arc::new(FakeApi::new().with_me(follower()).with_delay("unfollow_theme", Duration::from_millis(50)));
    let (_session, mut view) = profile_view(&api);
    view.load().await.unwrap();

    let observe = async {
        tokio::task::yield_now().await;
        view.unfollowing_id()
    };
    let (first, second, running) = tokio::join!(view.unfollow(1), view.unfollow(2), observe);
    assert!(first.is_ok());
    assert!(matches!(second, Err(ViewError::Busy)));
    assert_eq!(running, Some(1));
    assert_eq!(api.count("unfollow_theme"), 1);
    assert!(view.unfollowing_id().is_none());
}

#[tokio::test]
async fn successful_reload_clears_earlier_error() {
    let api = Arc::new(FakeApi::new().with_me(follower()).failing("me", unreachable));
    let (_session, mut view) = profile_view(&api);
    assert!(view.load().await.is_err());
    assert!(view.on_error());

    api.recover("me");
    view.load().await.unwrap();
    assert!(!view.on_error());
}

#[tokio::test]
async fn unfollow_failure_alerts_and_keeps_list() {
    let api = Arc::new(FakeApi::new().with_me(follower()));
    let (_session, mut view) = profile_view(&api);
    view.load().await.unwrap();
    api.fail("unfollow_theme", server_error);

    assert!(view.unfollow(1).await.is_err());
    assert_eq!(view.followed_themes().len(), 2);
    assert_eq!(view.take_alert(), Some(ALERT_UNFOLLOW_FAILED));
    assert_eq!(view.take_alert(), None);
    assert!(view.unfollowing_id().is_none());
}

#[tokio::test]
async fn submit_sends_update_without_blank_password() {
    let api = Arc::new(FakeApi::new().with_me(follower()));
    let (session, mut view) = profile_view(&api);
    view.load().await.unwrap();
    view.form.username = "torvalds".into();

    assert_eq!(view.submit().await.unwrap(), Next::Stay);
    let sent = &api.updates()[0];
    assert_eq!(sent.username, "torvalds");
    assert_eq!(sent.password, None);
    assert_eq!(session.current_user().map(|u| u.username), Some("torvalds".to_owned()));
}

#[tokio::test]
async fn submit_includes_typed_password() {
    let api = Arc::new(FakeApi::new().with_me(follower()));
    let (_session, mut view) = profile_view(&api);
    view.load().await.unwrap();
    view.form.password = "n3w-pass".into();

    view.submit().await.unwrap();
    assert_eq!(api.updates()[0].password.as_deref(), Some("n3w-pass"));
    assert!(view.form.password.is_empty());
}

#[tokio::test]
async fn submit_validation_and_failure() {
    let api = Arc::new(FakeApi::new().with_me(follower()));
    let (_session, mut view) = profile_view(&api);
    view.form = ProfileForm { username: String::new(), email: "bad".into(), password: String::new() };
    assert!(matches!(view.submit().await, Err(ViewError::Invalid(_))));
    assert!(api.updates().is_empty());

    view.form = ProfileForm { username: "linus".into(), email: "linus@mdd.test".into(), password: String::new() };
    api.fail("update_user", server_error);
    assert!(view.submit().await.is_err());
    assert!(view.on_error());
    assert_eq!(view.take_alert(), Some(ALERT_UPDATE_FAILED));
}
