use std::time::Duration;

use super::*;
use crate::session::SessionStore;
use crate::storage::MemoryTokenStorage;
use crate::test_support::{FakeApi, user};

fn router_with(session: &Arc<SessionStore>, api: FakeApi) -> (Arc<FakeApi>, Router) {
    let api = Arc::new(api);
    let guard = RouteGuard::new(session.clone(), Duration::from_secs(5));
    let router = Router::new(api.clone(), guard);
    (api, router)
}

#[test]
fn parse_known_paths() {
    assert_eq!(Route::parse(""), Route::Home);
    assert_eq!(Route::parse("/"), Route::Home);
    assert_eq!(Route::parse("/login"), Route::Login);
    assert_eq!(Route::parse("register"), Route::Register);
    assert_eq!(Route::parse("/profile/"), Route::Profile);
    assert_eq!(Route::parse("/mdd/articles"), Route::Articles);
    assert_eq!(Route::parse("/mdd/articles/42"), Route::ArticleDetail(42));
    assert_eq!(Route::parse("/mdd/themes"), Route::Themes);
    assert_eq!(Route::parse("/mdd/newArticle"), Route::NewArticle);
    assert_eq!(Route::parse("/404"), Route::NotFound);
}

#[test]
fn mdd_root_redirects_to_articles() {
    assert_eq!(Route::parse("/mdd"), Route::Articles);
    assert_eq!(Route::parse("/mdd/"), Route::Articles);
}

#[test]
fn unknown_paths_resolve_to_not_found() {
    assert_eq!(Route::parse("/nope"), Route::NotFound);
    assert_eq!(Route::parse("/mdd/articles/abc"), Route::NotFound);
    assert_eq!(Route::parse("/mdd/articles/1/edit"), Route::NotFound);
}

#[test]
fn query_and_fragment_are_ignored() {
    assert_eq!(Route::parse("/mdd/themes?page=2"), Route::Themes);
    assert_eq!(Route::parse("/login#top"), Route::Login);
}

#[test]
fn paths_round_trip_through_parse() {
    for route in [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Profile,
        Route::Articles,
        Route::ArticleDetail(7),
        Route::Themes,
        Route::NewArticle,
        Route::NotFound,
    ] {
        assert_eq!(Route::parse(&route.path()), route);
    }
}

#[test]
fn protected_set() {
    assert!(Route::Profile.requires_auth());
    assert!(Route::Articles.requires_auth());
    assert!(Route::ArticleDetail(1).requires_auth());
    assert!(Route::Themes.requires_auth());
    assert!(Route::NewArticle.requires_auth());
    assert!(!Route::Home.requires_auth());
    assert!(!Route::Login.requires_auth());
    assert!(!Route::Register.requires_auth());
    assert!(!Route::NotFound.requires_auth());
}

#[tokio::test]
async fn protected_route_redirects_to_login_when_logged_out() {
    let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStorage::new())));
    let (api, router) = router_with(&session, FakeApi::new());

    assert_eq!(router.navigate("/mdd/themes").await, Route::Login);
    assert_eq!(router.current(), Route::Login);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn public_routes_skip_the_guard() {
    let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStorage::new())));
    let (_api, router) = router_with(&session, FakeApi::new());

    assert_eq!(router.navigate("/register").await, Route::Register);
    assert_eq!(router.navigate("/unknown").await, Route::NotFound);
}

#[tokio::test]
async fn protected_route_reachable_after_log_in() {
    let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStorage::new())));
    let (_api, router) = router_with(&session, FakeApi::new());
    session.log_in(user(1, "ada"), "abc");

    assert_eq!(router.navigate_to(Route::ArticleDetail(3)).await, Route::ArticleDetail(3));
}

#[tokio::test]
async fn navigation_end_is_broadcast() {
    let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStorage::new())));
    let (_api, router) = router_with(&session, FakeApi::new());
    let mut events = router.subscribe();

    router.navigate("/mdd").await;
    let event = events.recv().await.unwrap();
    assert_eq!(event.requested, Route::Articles);
    assert_eq!(event.reached, Route::Login);
}
