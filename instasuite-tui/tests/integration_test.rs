use chrono::Utc;
use instasuite::api::{ApiClient, ApiError, MediaApi, MEDIA_FIELDS};
use instasuite::context::{ManualClock, SessionContext};
use instasuite::feed::{FeedLoader, FeedStatus, FetchOutcome};
use instasuite::loader::LoadError;
use instasuite::profile::{ProfileLoader, ProfileStatus};
use instasuite::storage::{FileStorageAdapter, MemoryStorageAdapter};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::Arc;

const PROFILE_PATH: &str = "/api/instagram-profile";
const MEDIA_PATH: &str = "/api/instagram-media";

fn create_client(server: &ServerGuard) -> ApiClient {
    ApiClient::new(
        format!("{}{}", server.url(), PROFILE_PATH),
        format!("{}{}", server.url(), MEDIA_PATH),
    )
}

fn session_with(token: Option<&str>) -> (SessionContext, ManualClock) {
    let clock = ManualClock::new(Utc::now());
    let session = SessionContext::with_clock(
        Box::new(MemoryStorageAdapter::new()),
        chrono::Duration::hours(1),
        Arc::new(clock.clone()),
    );
    if let Some(token) = token {
        session.login(token).unwrap();
    }
    (session, clock)
}

/// First page: only `fields`, no `after`
fn first_page_query() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::Regex("^fields=".to_string()),
        Matcher::UrlEncoded("fields".to_string(), MEDIA_FIELDS.to_string()),
    ])
}

fn after_query(cursor: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("after".to_string(), cursor.to_string()),
        Matcher::UrlEncoded("fields".to_string(), MEDIA_FIELDS.to_string()),
    ])
}

async fn media_mock(server: &mut ServerGuard, query: Matcher, status: usize, body: &str) -> Mock {
    server
        .mock("GET", MEDIA_PATH)
        .match_header("authorization", "Bearer tok")
        .match_query(query)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

const PAGE_ONE: &str = r#"{
    "data": [
        {"id": "a", "media_type": "IMAGE", "media_url": "https://cdn.example.com/a.jpg",
         "caption": "First", "permalink": "https://www.instagram.com/p/a/",
         "timestamp": "2024-03-01T10:00:00+0000",
         "comments": {"data": [{"id": "c1", "username": "sam", "text": "Nice", "timestamp": "2024-03-01T11:00:00+0000"}]}},
        {"id": "b", "media_type": "VIDEO", "media_url": "https://cdn.example.com/b.mp4",
         "thumbnail_url": "https://cdn.example.com/b.jpg",
         "permalink": "https://www.instagram.com/p/b/", "timestamp": "2024-02-28T10:00:00+0000"}
    ],
    "paging": {"cursors": {"before": "x", "after": "c1"}, "next": "https://graph.instagram.com/v21.0/me/media?after=c1"}
}"#;

const PAGE_TWO: &str = r#"{
    "data": [
        {"id": "b", "media_type": "VIDEO", "media_url": "https://cdn.example.com/b-new.mp4",
         "permalink": "https://www.instagram.com/p/b/", "timestamp": "2024-02-28T10:00:00+0000"},
        {"id": "c", "media_type": "CAROUSEL_ALBUM", "media_url": "https://cdn.example.com/c.jpg",
         "permalink": "https://www.instagram.com/p/c/", "timestamp": "2024-02-20T10:00:00+0000"}
    ],
    "paging": {"cursors": {"before": "c1", "after": "c2"}}
}"#;

#[tokio::test]
async fn test_profile_loads_with_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PROFILE_PATH)
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"1784","username":"jane.doe","account_type":"BUSINESS","media_count":12,"followers_count":340}"#)
        .create_async()
        .await;
    let (session, _clock) = session_with(Some("tok-1"));

    let mut loader = ProfileLoader::new();
    loader.load(&create_client(&server), &session).await;

    match loader.status() {
        ProfileStatus::Ready(profile) => {
            assert_eq!(profile.username, "jane.doe");
            assert_eq!(profile.media_count, 12);
            assert_eq!(profile.followers_count, Some(340));
        }
        other => panic!("unexpected status {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_profile_unauthorized_surfaces_server_message() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PROFILE_PATH)
        .with_status(401)
        .with_body(r#"{"error":"Invalid OAuth access token"}"#)
        .create_async()
        .await;
    let (session, _clock) = session_with(Some("stale"));

    let mut loader = ProfileLoader::new();
    loader.load(&create_client(&server), &session).await;

    assert!(loader.profile().is_none());
    assert_eq!(
        loader.error(),
        Some(&LoadError::Transport("Invalid OAuth access token".to_string()))
    );
}

#[tokio::test]
async fn test_profile_error_without_message_uses_fallback() {
    let mut server = Server::new_async().await;
    let _mock = server.mock("GET", PROFILE_PATH).with_status(500).create_async().await;
    let (session, _clock) = session_with(Some("tok"));

    let mut loader = ProfileLoader::new();
    loader.load(&create_client(&server), &session).await;

    assert_eq!(
        loader.error(),
        Some(&LoadError::Transport("Failed to fetch profile".to_string()))
    );
}

#[tokio::test]
async fn test_malformed_profile_is_no_data() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PROFILE_PATH)
        .with_status(200)
        .with_body(r#"{"unexpected": true}"#)
        .create_async()
        .await;
    let (session, _clock) = session_with(Some("tok"));

    let mut loader = ProfileLoader::new();
    loader.load(&create_client(&server), &session).await;

    assert_eq!(loader.status(), ProfileStatus::NoData);
    assert!(loader.error().is_none());
}

#[tokio::test]
async fn test_feed_pages_accumulate_without_duplicates() {
    let mut server = Server::new_async().await;
    let first = media_mock(&mut server, first_page_query(), 200, PAGE_ONE).await;
    let second = media_mock(&mut server, after_query("c1"), 200, PAGE_TWO).await;
    let (session, _clock) = session_with(Some("tok"));
    let client = create_client(&server);

    let mut feed = FeedLoader::new();
    assert_eq!(feed.load_initial(&client, &session).await, FetchOutcome::Loaded { added: 2 });
    assert_eq!(feed.next_cursor(), Some("c1"));
    assert_eq!(feed.items()[0].comment_count(), 1);

    assert_eq!(feed.load_more(&client, &session).await, FetchOutcome::Loaded { added: 1 });

    let ids: Vec<&str> = feed.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    // First-seen copy of "b" is kept
    assert_eq!(feed.get("b").and_then(|i| i.media_url.as_deref()), Some("https://cdn.example.com/b.mp4"));
    // No `next` link on the last page, so no cursor
    assert!(!feed.has_more());
    assert_eq!(feed.load_more(&client, &session).await, FetchOutcome::Skipped);

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_feed_failure_keeps_items_and_retries() {
    let mut server = Server::new_async().await;
    let _first = media_mock(&mut server, first_page_query(), 200, PAGE_ONE).await;
    let failing = media_mock(
        &mut server,
        after_query("c1"),
        500,
        r#"{"error":{"message":"Please reduce the amount of data"}}"#,
    )
    .await;
    let (session, _clock) = session_with(Some("tok"));
    let client = create_client(&server);

    let mut feed = FeedLoader::new();
    feed.load_initial(&client, &session).await;
    let outcome = feed.load_more(&client, &session).await;

    assert_eq!(
        outcome,
        FetchOutcome::Failed(LoadError::Transport("Please reduce the amount of data".to_string()))
    );
    assert_eq!(feed.items().len(), 2);
    assert!(!feed.is_in_flight());
    failing.assert_async().await;
    failing.remove_async().await;

    // The retry asks for the same cursor again
    let retried = media_mock(&mut server, after_query("c1"), 200, PAGE_TWO).await;
    feed.retry(&client, &session).await;

    assert_eq!(feed.items().len(), 3);
    assert!(feed.error().is_none());
    retried.assert_async().await;
}

#[tokio::test]
async fn test_empty_feed() {
    let mut server = Server::new_async().await;
    let _mock = media_mock(&mut server, first_page_query(), 200, r#"{"data": [], "paging": {}}"#).await;
    let (session, _clock) = session_with(Some("tok"));

    let mut feed = FeedLoader::new();
    feed.load_initial(&create_client(&server), &session).await;
    assert_eq!(feed.status(), FeedStatus::Empty);
}

#[tokio::test]
async fn test_missing_token_sends_no_request() {
    let mut server = Server::new_async().await;
    let profile_mock = server.mock("GET", PROFILE_PATH).expect(0).create_async().await;
    let media_mock = server
        .mock("GET", MEDIA_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let (session, _clock) = session_with(None);
    let client = create_client(&server);

    let mut profile = ProfileLoader::new();
    profile.load(&client, &session).await;
    assert_eq!(profile.error(), Some(&LoadError::MissingToken));

    let mut feed = FeedLoader::new();
    let outcome = feed.load_initial(&client, &session).await;
    assert_eq!(outcome, FetchOutcome::Failed(LoadError::MissingToken));

    profile_mock.assert_async().await;
    media_mock.assert_async().await;
}

#[tokio::test]
async fn test_expired_token_sends_no_request() {
    let mut server = Server::new_async().await;
    let first = media_mock(&mut server, first_page_query(), 200, PAGE_ONE).await;
    let next = server
        .mock("GET", MEDIA_PATH)
        .match_query(after_query("c1"))
        .expect(0)
        .create_async()
        .await;
    let (session, clock) = session_with(Some("tok"));
    let client = create_client(&server);

    let mut feed = FeedLoader::new();
    feed.load_initial(&client, &session).await;

    clock.advance(chrono::Duration::hours(2));
    let outcome = feed.load_more(&client, &session).await;

    assert_eq!(outcome, FetchOutcome::Failed(LoadError::MissingToken));
    assert_eq!(feed.items().len(), 2);
    assert!(session.get().unwrap().is_none());
    first.assert_async().await;
    next.assert_async().await;
}

#[tokio::test]
async fn test_client_error_variants() {
    let mut server = Server::new_async().await;
    let client = create_client(&server);

    let not_found = server
        .mock("GET", PROFILE_PATH)
        .with_status(404)
        .with_body(r#"{"error":"No such account"}"#)
        .create_async()
        .await;
    match client.fetch_profile("tok").await {
        Err(ApiError::NotFound(msg)) => assert_eq!(msg, "No such account"),
        other => panic!("expected NotFound, got {:?}", other.map(|p| p.username)),
    }
    not_found.remove_async().await;

    let _garbage = server
        .mock("GET", PROFILE_PATH)
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;
    assert!(matches!(client.fetch_profile("tok").await, Err(ApiError::Serialization(_))));
}

#[test]
fn test_token_survives_restart_until_expiry() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("session");
    let clock = ManualClock::new(Utc::now());

    let first = SessionContext::with_clock(
        Box::new(FileStorageAdapter::new(&path)),
        chrono::Duration::hours(1),
        Arc::new(clock.clone()),
    );
    first.login("persisted-token").unwrap();
    drop(first);

    let second = SessionContext::with_clock(
        Box::new(FileStorageAdapter::new(&path)),
        chrono::Duration::hours(1),
        Arc::new(clock.clone()),
    );
    assert_eq!(second.get().unwrap(), Some("persisted-token".to_string()));

    clock.advance(chrono::Duration::minutes(60));
    assert_eq!(second.get().unwrap(), None);
    assert!(!path.exists());
}
