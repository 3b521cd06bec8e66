use super::*;
use crate::api::{ApiError, ApiResult};
use crate::context::ManualClock;
use crate::loader::LoadError;
use crate::storage::MemoryStorageAdapter;
use async_trait::async_trait;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use instasuite_types::{Cursors, FeedPage, MediaType, Paging, Profile};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Helper to create a KeyEvent
fn key_event(code: KeyCode) -> KeyEvent {
    let mut event = KeyEvent::new(code, KeyModifiers::empty());
    event.kind = KeyEventKind::Press;
    event
}

/// Scripted stand-in for the remote API
#[derive(Default)]
struct FakeApi {
    profile: Mutex<Option<Result<Profile, String>>>,
    pages: Mutex<VecDeque<Result<FeedPage, String>>>,
    cursors: Mutex<Vec<Option<String>>>,
    calls: AtomicUsize,
}

impl FakeApi {
    fn with_pages(pages: Vec<Result<FeedPage, String>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaApi for FakeApi {
    async fn fetch_profile(&self, _token: &str) -> ApiResult<Profile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.profile.lock().unwrap().clone() {
            Some(Ok(profile)) => Ok(profile),
            Some(Err(msg)) => Err(ApiError::Unauthorized(msg)),
            None => Err(ApiError::Api(String::new())),
        }
    }

    async fn fetch_media_page(&self, _token: &str, cursor: Option<&str>) -> ApiResult<FeedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cursors.lock().unwrap().push(cursor.map(str::to_string));
        match self.pages.lock().unwrap().pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(msg)) => Err(ApiError::Api(msg)),
            None => Ok(FeedPage::default()),
        }
    }
}

fn item(id: &str) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        media_type: MediaType::Image,
        media_url: Some(format!("https://cdn.example.com/{}.jpg", id)),
        thumbnail_url: None,
        caption: Some(format!("Post {}", id)),
        permalink: format!("https://www.instagram.com/p/{}/", id),
        timestamp: Utc::now(),
        comments: None,
    }
}

fn page(ids: &[&str], cursor: Option<&str>) -> FeedPage {
    FeedPage {
        data: ids.iter().map(|id| item(id)).collect(),
        paging: Paging {
            cursors: cursor.map(|c| Cursors {
                before: None,
                after: Some(c.to_string()),
            }),
            next: cursor.map(|_| "https://graph.example.com/next".to_string()),
        },
    }
}

fn profile() -> Profile {
    Profile {
        id: "17841400000000000".to_string(),
        username: "jane.doe".to_string(),
        account_type: Some("BUSINESS".to_string()),
        media_count: 42,
        followers_count: Some(1200),
        biography: Some("Photos".to_string()),
        website: Some("https://jane.example.com/about".to_string()),
        profile_picture_url: None,
    }
}

/// App over `api`, with a token stored if `token` is given
fn app_with(api: Arc<FakeApi>, token: Option<&str>) -> (App, ManualClock) {
    let clock = ManualClock::new(Utc::now());
    let session = SessionContext::with_clock(
        Box::new(MemoryStorageAdapter::new()),
        chrono::Duration::hours(1),
        Arc::new(clock.clone()),
    );
    if let Some(token) = token {
        session.login(token).unwrap();
    }
    let app = App::new(api, session, ClientSettings::default());
    (app, clock)
}

#[test]
fn test_routes_to_login_without_token() {
    let (app, _clock) = app_with(Arc::new(FakeApi::default()), None);
    assert_eq!(app.current_screen, Screen::Login);
    assert!(app
        .login
        .authorization_url
        .as_deref()
        .unwrap()
        .starts_with("https://api.instagram.com/oauth/authorize?"));
    assert!(!app.needs_tab_data_load());
}

#[test]
fn test_routes_to_main_with_token() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), Some("tok"));
    assert_eq!(app.current_screen, Screen::Main);
    assert_eq!(app.current_tab, Tab::Profile);
    assert!(app.needs_tab_data_load());

    app.queue_tab_data_load();
    assert_eq!(app.pending, vec![PendingAction::FetchProfile]);
    assert_eq!(app.profile.status(), ProfileStatus::Loading);
    assert!(!app.needs_tab_data_load());
}

#[test]
fn test_escape_closes_help_modal_first() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), Some("tok"));
    app.show_help = true;

    app.handle_key_event(key_event(KeyCode::Esc)).unwrap();

    assert!(!app.show_help, "Help modal should be closed");
    assert!(app.running, "App should still be running");
}

#[test]
fn test_question_mark_toggles_help() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), Some("tok"));

    app.handle_key_event(key_event(KeyCode::Char('?'))).unwrap();
    assert!(app.show_help, "Help modal should be open");

    // Other keys are swallowed while help is open
    app.handle_key_event(key_event(KeyCode::Char('q'))).unwrap();
    assert!(app.running);

    app.handle_key_event(key_event(KeyCode::Char('?'))).unwrap();
    assert!(!app.show_help, "Help modal should be closed");
}

#[test]
fn test_ctrl_c_quits() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), None);
    let mut event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    event.kind = KeyEventKind::Press;

    app.handle_key_event(event).unwrap();
    assert!(!app.running);
}

#[test]
fn test_tab_switching() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), Some("tok"));

    app.handle_key_event(key_event(KeyCode::Tab)).unwrap();
    assert_eq!(app.current_tab, Tab::Gallery);
    assert!(app.needs_tab_data_load());

    app.handle_key_event(key_event(KeyCode::BackTab)).unwrap();
    assert_eq!(app.current_tab, Tab::Profile);

    app.handle_key_event(key_event(KeyCode::Char('2'))).unwrap();
    assert_eq!(app.current_tab, Tab::Gallery);
    app.handle_key_event(key_event(KeyCode::Char('1'))).unwrap();
    assert_eq!(app.current_tab, Tab::Profile);
}

#[test]
fn test_enter_on_login_requests_login() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), None);

    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();
    assert_eq!(app.pending, vec![PendingAction::StartLogin]);

    // Repeated presses don't queue twice
    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();
    assert_eq!(app.pending.len(), 1);
}

#[test]
fn test_accept_token_routes_to_main() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), None);
    app.accept_token("fresh-token").unwrap();

    assert_eq!(app.current_screen, Screen::Main);
    assert_eq!(app.session.get().unwrap(), Some("fresh-token".to_string()));
    assert!(app.accept_token("   ").is_err());
}

#[test]
fn test_logout_clears_token() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), Some("tok"));

    app.handle_key_event(key_event(KeyCode::Char('L'))).unwrap();

    assert_eq!(app.current_screen, Screen::Login);
    assert!(!app.session.is_authenticated());
    assert!(app.login.notice.is_none());
}

#[test]
fn test_expired_token_routes_to_login_on_key_press() {
    let api = Arc::new(FakeApi::default());
    let (mut app, clock) = app_with(api.clone(), Some("tok"));

    clock.advance(chrono::Duration::hours(1));
    app.handle_key_event(key_event(KeyCode::Tab)).unwrap();

    assert_eq!(app.current_screen, Screen::Login);
    assert_eq!(app.login.notice.as_deref(), Some(SESSION_EXPIRED_NOTICE));
    assert_eq!(app.current_tab, Tab::Profile, "the key itself is not applied");
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_expiry_before_queued_load_sends_nothing() {
    let api = Arc::new(FakeApi::with_pages(vec![Ok(page(&["a"], None))]));
    let (mut app, clock) = app_with(api.clone(), Some("tok"));
    app.select_tab(Tab::Gallery);
    app.queue_feed_load();

    clock.advance(chrono::Duration::minutes(61));
    app.run_pending().await.unwrap();

    assert_eq!(api.calls(), 0);
    assert_eq!(app.current_screen, Screen::Login);
    assert_eq!(app.login.notice.as_deref(), Some(SESSION_EXPIRED_NOTICE));
}

#[tokio::test]
async fn test_profile_load_and_failure() {
    let api = Arc::new(FakeApi::default());
    *api.profile.lock().unwrap() = Some(Ok(profile()));
    let (mut app, _clock) = app_with(api.clone(), Some("tok"));

    app.queue_profile_load();
    app.run_pending().await.unwrap();
    assert_eq!(app.profile.profile().map(|p| p.username.as_str()), Some("jane.doe"));
    assert!(!app.needs_tab_data_load());

    *api.profile.lock().unwrap() = Some(Err("Invalid OAuth access token".to_string()));
    app.handle_key_event(key_event(KeyCode::Char('r'))).unwrap();
    assert_eq!(app.profile.status(), ProfileStatus::Loading);
    app.run_pending().await.unwrap();

    assert!(app.profile.profile().is_none());
    assert_eq!(
        app.profile.error().map(|e| e.to_string()),
        Some("Invalid OAuth access token".to_string())
    );
    assert_eq!(app.current_screen, Screen::Main);
}

#[tokio::test]
async fn test_gallery_navigation_and_detail() {
    let api = Arc::new(FakeApi::with_pages(vec![Ok(page(&["a", "b", "c"], None))]));
    let (mut app, _clock) = app_with(api.clone(), Some("tok"));
    app.select_tab(Tab::Gallery);
    app.queue_feed_load();
    app.run_pending().await.unwrap();

    assert_eq!(app.gallery.list_state.selected(), Some(0));
    app.handle_key_event(key_event(KeyCode::Char('j'))).unwrap();
    app.handle_key_event(key_event(KeyCode::Char('j'))).unwrap();
    app.handle_key_event(key_event(KeyCode::Char('j'))).unwrap();
    assert_eq!(app.selected_item().map(|i| i.id.as_str()), Some("c"));
    app.handle_key_event(key_event(KeyCode::Char('k'))).unwrap();
    assert_eq!(app.selected_item().map(|i| i.id.as_str()), Some("b"));

    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();
    assert_eq!(app.detail.selected().map(|i| i.id.as_str()), Some("b"));

    // Tab keys are ignored while the overlay is open
    app.handle_key_event(key_event(KeyCode::Tab)).unwrap();
    assert_eq!(app.current_tab, Tab::Gallery);

    app.handle_key_event(key_event(KeyCode::Char('o'))).unwrap();
    assert_eq!(
        app.pending,
        vec![PendingAction::OpenUrl("https://www.instagram.com/p/b/".to_string())]
    );
    app.pending.clear();

    app.handle_key_event(key_event(KeyCode::Esc)).unwrap();
    assert!(!app.detail.is_open());
    assert!(app.running);
}

#[tokio::test]
async fn test_load_more_merges_and_stops() {
    let api = Arc::new(FakeApi::with_pages(vec![
        Ok(page(&["a", "b"], Some("c1"))),
        Ok(page(&["b", "c"], None)),
    ]));
    let (mut app, _clock) = app_with(api.clone(), Some("tok"));
    app.select_tab(Tab::Gallery);
    app.queue_feed_load();
    app.run_pending().await.unwrap();

    app.handle_key_event(key_event(KeyCode::Char('m'))).unwrap();
    assert_eq!(
        app.pending,
        vec![PendingAction::FetchFeed(FeedRequest::After("c1".to_string()))]
    );
    // The next frame shows the footer spinner while the page is fetched
    assert_eq!(app.feed.status(), FeedStatus::LoadingMore);
    assert_eq!(app.gallery_items().len(), 2);

    // A second press while the page is in flight queues nothing
    app.handle_key_event(key_event(KeyCode::Char('m'))).unwrap();
    assert_eq!(app.pending.len(), 1);
    assert_eq!(api.calls(), 1);

    app.run_pending().await.unwrap();
    assert_eq!(app.feed.status(), FeedStatus::Ready);

    let ids: Vec<&str> = app.gallery_items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(*api.cursors.lock().unwrap(), vec![None, Some("c1".to_string())]);

    // Last page reached: 'm' does nothing
    app.handle_key_event(key_event(KeyCode::Char('m'))).unwrap();
    assert!(app.pending.is_empty());
    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn test_retry_after_failed_page() {
    let api = Arc::new(FakeApi::with_pages(vec![
        Ok(page(&["a"], Some("c1"))),
        Err("Rate limit reached".to_string()),
        Ok(page(&["b"], None)),
    ]));
    let (mut app, _clock) = app_with(api.clone(), Some("tok"));
    app.select_tab(Tab::Gallery);
    app.queue_feed_load();
    app.run_pending().await.unwrap();

    app.queue_load_more();
    app.run_pending().await.unwrap();
    assert_eq!(app.feed.error().map(|e| e.to_string()), Some("Rate limit reached".to_string()));
    assert_eq!(app.gallery_items().len(), 1);

    app.handle_key_event(key_event(KeyCode::Char('r'))).unwrap();
    assert_eq!(
        app.pending,
        vec![PendingAction::FetchFeed(FeedRequest::After("c1".to_string()))]
    );
    assert_eq!(app.feed.status(), FeedStatus::LoadingMore);
    app.run_pending().await.unwrap();

    assert!(app.feed.error().is_none());
    assert_eq!(app.gallery_items().len(), 2);
    assert_eq!(api.cursors.lock().unwrap().last(), Some(&Some("c1".to_string())));
}

#[tokio::test]
async fn test_refresh_shows_loading_before_fetch() {
    let api = Arc::new(FakeApi::with_pages(vec![Ok(page(&["a"], None)), Ok(page(&["z"], None))]));
    let (mut app, _clock) = app_with(api.clone(), Some("tok"));
    app.select_tab(Tab::Gallery);
    app.queue_feed_load();
    app.run_pending().await.unwrap();
    assert_eq!(app.feed.status(), FeedStatus::Ready);

    app.handle_key_event(key_event(KeyCode::Char('r'))).unwrap();
    assert_eq!(app.feed.status(), FeedStatus::Loading);
    assert_eq!(app.pending, vec![PendingAction::FetchFeed(FeedRequest::Initial)]);
    assert_eq!(app.gallery.list_state.selected(), None);

    app.run_pending().await.unwrap();
    let ids: Vec<&str> = app.gallery_items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["z"]);
}

#[test]
fn test_missing_token_error_is_not_retried() {
    let (mut app, _clock) = app_with(Arc::new(FakeApi::default()), Some("tok"));
    app.select_tab(Tab::Gallery);
    app.feed.begin_initial();
    app.feed.complete(Err(LoadError::MissingToken));

    app.handle_key_event(key_event(KeyCode::Char('r'))).unwrap();

    assert!(app.pending.is_empty());
    assert_eq!(app.feed.status(), FeedStatus::Failed(&LoadError::MissingToken));
}
