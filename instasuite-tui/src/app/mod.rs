mod handlers;
mod state;

#[cfg(test)]
mod tests;

pub use state::*;

use anyhow::{Context, Result};
use instasuite_types::MediaItem;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::error::TryRecvError;

use crate::api::MediaApi;
use crate::auth::AuthFlow;
use crate::callback::CallbackListener;
use crate::config::ClientSettings;
use crate::context::{SessionContext, TokenLookup};
use crate::detail::DetailOverlay;
use crate::feed::{FeedLoader, FeedRequest, FeedStatus, FetchOutcome};
use crate::profile::{ProfileLoader, ProfileStatus};
use crate::{log_api_call, log_debug, log_session};

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

impl App {
    /// Create the app and pick the first screen from the stored session
    pub fn new(api: Arc<dyn MediaApi>, session: SessionContext, settings: ClientSettings) -> Self {
        let mut app = Self {
            running: true,
            current_screen: Screen::Login,
            current_tab: Tab::Profile,
            api,
            session,
            settings,
            login: LoginState::default(),
            profile: ProfileLoader::new(),
            feed: FeedLoader::new(),
            gallery: GalleryState::default(),
            detail: DetailOverlay::default(),
            show_help: false,
            pending: Vec::new(),
            status_message: None,
            log_config: crate::logging::LogConfig::default(),
        };
        app.route();
        app
    }

    /// Choose the screen from the token store: main with a token, login without
    pub fn route(&mut self) {
        if self.session.is_authenticated() {
            self.enter_main();
        } else {
            self.enter_login(None);
        }
    }

    fn enter_main(&mut self) {
        log_session!(self.log_config, "Entering main screen");
        self.login.cancel();
        self.login.error = None;
        self.login.notice = None;
        self.current_screen = Screen::Main;
        self.current_tab = Tab::Profile;
        self.reset_views();
    }

    fn enter_login(&mut self, notice: Option<String>) {
        log_session!(self.log_config, "Entering login screen (notice: {:?})", notice);
        self.current_screen = Screen::Login;
        self.login.notice = notice;
        self.login.authorization_url = Some(AuthFlow::new(&self.settings).authorization_url());
        self.reset_views();
    }

    fn reset_views(&mut self) {
        self.profile.reset();
        self.feed.reset();
        self.gallery.list_state.select(None);
        self.detail.close();
        self.show_help = false;
        self.pending.clear();
    }

    /// Re-check the token before acting on the main screen.
    ///
    /// Returns false, after routing to login, when the token is gone.
    pub fn ensure_session(&mut self) -> bool {
        if self.current_screen != Screen::Main {
            return true;
        }

        let lookup = self.session.lookup().unwrap_or_else(|e| {
            log::warn!(target: "session", "Failed to read token store: {}", e);
            TokenLookup::Missing
        });

        match lookup {
            TokenLookup::Valid(_) => true,
            TokenLookup::Expired | TokenLookup::Missing => {
                log_session!(self.log_config, "Session no longer valid, routing to login");
                self.enter_login(Some(SESSION_EXPIRED_NOTICE.to_string()));
                false
            }
        }
    }

    /// Store a freshly issued token and switch to the main screen
    pub fn accept_token(&mut self, token: &str) -> Result<()> {
        self.session.login(token).context("Failed to save token")?;
        self.route();
        Ok(())
    }

    /// Forget the token and return to login
    pub fn logout(&mut self) -> Result<()> {
        self.session.clear().context("Failed to clear token")?;
        log_session!(self.log_config, "Logged out");
        self.route();
        Ok(())
    }

    /// Handle a key press; see [`handlers`] for the priority order
    pub fn handle_key_event(&mut self, key: crossterm::event::KeyEvent) -> Result<()> {
        handlers::handle_key_event(self, key)
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if self.current_tab != tab {
            log_debug!(self.log_config, "Switching to {:?} tab", tab);
            self.detail.close();
            self.current_tab = tab;
        }
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.current_tab.next());
    }

    pub fn previous_tab(&mut self) {
        self.select_tab(self.current_tab.previous());
    }

    /// Queue work for the event loop; duplicates are dropped
    pub fn request(&mut self, action: PendingAction) {
        if !self.pending.contains(&action) {
            self.pending.push(action);
        }
    }

    /// Whether the current tab has never been loaded
    pub fn needs_tab_data_load(&self) -> bool {
        if self.current_screen != Screen::Main {
            return false;
        }
        match self.current_tab {
            Tab::Profile => self.profile.status() == ProfileStatus::Idle,
            Tab::Gallery => self.feed.status() == FeedStatus::Idle,
        }
    }

    /// Start the first load of the current tab
    pub fn queue_tab_data_load(&mut self) {
        if !self.needs_tab_data_load() {
            return;
        }
        match self.current_tab {
            Tab::Profile => self.queue_profile_load(),
            Tab::Gallery => self.queue_feed_load(),
        }
    }

    // The queue_* methods mark the loader busy right away, so the frame
    // drawn before the request goes out already shows it loading.

    pub fn queue_profile_load(&mut self) {
        if self.profile.is_loading() {
            return;
        }
        self.profile.begin();
        self.request(PendingAction::FetchProfile);
    }

    /// Reload the feed from the first page
    pub fn queue_feed_load(&mut self) {
        let request = self.feed.begin_initial();
        self.queue_feed_request(request);
    }

    pub fn queue_load_more(&mut self) {
        let request = self.feed.begin_load_more();
        self.queue_feed_request(request);
    }

    pub fn queue_feed_retry(&mut self) {
        let request = self.feed.begin_retry();
        self.queue_feed_request(request);
    }

    fn queue_feed_request(&mut self, request: Option<FeedRequest>) {
        if let Some(request) = request {
            self.clamp_selection();
            self.request(PendingAction::FetchFeed(request));
        }
    }

    /// Items shown in the gallery list
    pub fn gallery_items(&self) -> Vec<&MediaItem> {
        self.feed.visible_items()
    }

    pub fn selected_item(&self) -> Option<&MediaItem> {
        let index = self.gallery.list_state.selected()?;
        self.gallery_items().get(index).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.gallery_items().len();
        if len == 0 {
            return;
        }
        let next = match self.gallery.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.gallery.list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.gallery_items().is_empty() {
            return;
        }
        let previous = self.gallery.list_state.selected().map(|i| i.saturating_sub(1)).unwrap_or(0);
        self.gallery.list_state.select(Some(previous));
    }

    pub fn open_selected_detail(&mut self) {
        if let Some(item) = self.selected_item().cloned() {
            self.detail.open(&item);
        }
    }

    /// Keep the selection on a visible row after the list changes
    fn clamp_selection(&mut self) {
        let len = self.gallery_items().len();
        let selected = match (len, self.gallery.list_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(i)) => Some(i.min(len - 1)),
        };
        self.gallery.list_state.select(selected);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn clear_expired_messages(&mut self) {
        if let Some((_, at)) = &self.status_message {
            if at.elapsed() >= STATUS_MESSAGE_TTL {
                self.status_message = None;
            }
        }
    }

    async fn fetch_profile(&mut self) {
        log_api_call!(self.log_config, "Loading profile");
        let api = Arc::clone(&self.api);
        self.profile.fetch(api.as_ref(), &self.session).await;
    }

    async fn fetch_feed(&mut self, request: FeedRequest) -> FetchOutcome {
        log_api_call!(self.log_config, "Loading media page after {:?}", request.cursor());
        let api = Arc::clone(&self.api);
        let outcome = self.feed.fetch(request, api.as_ref(), &self.session).await;
        self.clamp_selection();
        outcome
    }

    /// Bind the callback listener and send the user to the authorization page
    pub async fn start_login(&mut self) -> Result<()> {
        if self.login.waiting {
            return Ok(());
        }
        self.login.error = None;

        let flow = AuthFlow::new(&self.settings);
        if !self.settings.has_client_id() {
            anyhow::bail!("No client id configured. Set INSTASUITE_CLIENT_ID or pass --client-id.");
        }

        let listener = CallbackListener::bind(flow.redirect_uri()).await?;
        let (rx, task) = listener.spawn();
        self.login.token_rx = Some(rx);
        self.login.listener_task = Some(task);
        self.login.waiting = true;

        self.login.authorization_url = Some(flow.authorization_url());
        // The listener keeps waiting; the URL on screen can be opened by hand
        if let Err(e) = flow.open_browser() {
            log::warn!(target: "session", "{:#}", e);
            self.login.error = Some("Could not open a browser. Open the URL above manually.".to_string());
        }
        Ok(())
    }

    /// Pick up a token delivered by the callback listener. Returns whether
    /// the app switched to the main screen.
    pub fn poll_login(&mut self) -> Result<bool> {
        let Some(rx) = self.login.token_rx.as_mut() else {
            return Ok(false);
        };

        match rx.try_recv() {
            Ok(token) => {
                self.login.cancel();
                self.accept_token(&token)?;
                Ok(true)
            }
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => {
                self.login.cancel();
                self.login.error = Some("Login listener stopped before a token arrived".to_string());
                Ok(false)
            }
        }
    }

    /// Run every queued action, then re-check the session
    pub async fn run_pending(&mut self) -> Result<()> {
        let actions = std::mem::take(&mut self.pending);
        for action in actions {
            match action {
                PendingAction::FetchProfile => self.fetch_profile().await,
                PendingAction::FetchFeed(request) => {
                    let outcome = self.fetch_feed(request).await;
                    log::debug!(target: "api_calls", "Media page finished: {:?}", outcome);
                }
                PendingAction::StartLogin => {
                    if let Err(e) = self.start_login().await {
                        log::error!(target: "session", "Login failed to start: {:#}", e);
                        self.login.cancel();
                        self.login.error = Some(e.to_string());
                    }
                }
                PendingAction::OpenUrl(url) => match webbrowser::open(&url) {
                    Ok(()) => self.set_status("Opened in browser"),
                    Err(e) => {
                        log::warn!("Failed to open {}: {}", url, e);
                        self.set_status(format!("Could not open browser: {}", e));
                    }
                },
            }

            // A load that found no token means the session lapsed
            if !self.ensure_session() {
                break;
            }
        }
        Ok(())
    }
}
