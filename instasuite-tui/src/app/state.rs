use ratatui::widgets::ListState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::MediaApi;
use crate::config::ClientSettings;
use crate::context::SessionContext;
use crate::detail::DetailOverlay;
use crate::feed::{FeedLoader, FeedRequest};
use crate::profile::ProfileLoader;

pub const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen {
    Login,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Profile,
    Gallery,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Profile, Tab::Gallery];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Profile => "Profile",
            Tab::Gallery => "Gallery",
        }
    }

    pub fn next(&self) -> Tab {
        match self {
            Tab::Profile => Tab::Gallery,
            Tab::Gallery => Tab::Profile,
        }
    }

    pub fn previous(&self) -> Tab {
        // Two tabs: previous and next coincide
        self.next()
    }
}

/// Work requested by a key press that needs the runtime (network or
/// browser). Key handling stays synchronous; the event loop drains these.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    /// The profile loader is already marked as loading
    FetchProfile,
    /// A feed page the loader has already committed to
    FetchFeed(FeedRequest),
    StartLogin,
    OpenUrl(String),
}

/// Login screen state
#[derive(Default)]
pub struct LoginState {
    /// Set while the callback listener is waiting for the redirect
    pub waiting: bool,
    pub authorization_url: Option<String>,
    pub error: Option<String>,
    /// Shown after a token lapses mid-session
    pub notice: Option<String>,
    pub token_rx: Option<mpsc::Receiver<String>>,
    pub listener_task: Option<JoinHandle<()>>,
}

impl LoginState {
    /// Stop waiting for the redirect and drop the listener
    pub fn cancel(&mut self) {
        if let Some(task) = self.listener_task.take() {
            task.abort();
        }
        self.token_rx = None;
        self.waiting = false;
    }
}

/// Gallery tab state
#[derive(Default)]
pub struct GalleryState {
    pub list_state: ListState,
}

/// Main application state
pub struct App {
    pub running: bool,
    pub current_screen: Screen,
    pub current_tab: Tab,
    pub api: Arc<dyn MediaApi>,
    pub session: SessionContext,
    pub settings: ClientSettings,
    pub login: LoginState,
    pub profile: ProfileLoader,
    pub feed: FeedLoader,
    pub gallery: GalleryState,
    pub detail: DetailOverlay,
    pub show_help: bool,
    pub pending: Vec<PendingAction>,
    /// Transient status line, e.g. "Opened in browser"
    pub status_message: Option<(String, std::time::Instant)>,
    pub log_config: crate::logging::LogConfig,
}
