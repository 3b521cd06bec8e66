use std::collections::HashMap;

use instasuite_types::{FeedPage, MediaItem};

use crate::api::{ApiError, MediaApi};
use crate::context::SessionContext;
use crate::loader::LoadError;

const FEED_FALLBACK_ERROR: &str = "Failed to load media";
const FEED_UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Insertion-ordered set of media items keyed by id.
///
/// Inserting an id that is already present is a no-op: the first-seen item
/// stays where it is and is not replaced.
#[derive(Debug, Clone, Default)]
pub struct FeedAccumulator {
    items: Vec<MediaItem>,
    index: HashMap<String, usize>,
}

impl FeedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `item` unless its id is already present. Returns whether it was added.
    pub fn insert(&mut self, item: MediaItem) -> bool {
        if self.index.contains_key(&item.id) {
            return false;
        }
        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        true
    }

    /// Insert every item in order, returning how many were new
    pub fn extend<I: IntoIterator<Item = MediaItem>>(&mut self, items: I) -> usize {
        let mut added = 0;
        for item in items {
            if self.insert(item) {
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, id: &str) -> Option<&MediaItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

/// A page request the loader has committed to
#[derive(Debug, Clone, PartialEq)]
pub enum FeedRequest {
    Initial,
    After(String),
}

impl FeedRequest {
    pub fn cursor(&self) -> Option<&str> {
        match self {
            FeedRequest::Initial => None,
            FeedRequest::After(cursor) => Some(cursor),
        }
    }
}

/// What a load call ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The guard refused the request; nothing changed
    Skipped,
    /// A page arrived; `added` items were new
    Loaded { added: usize },
    Failed(LoadError),
}

/// Display state derived from the loader
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedStatus<'a> {
    Idle,
    Loading,
    LoadingMore,
    Failed(&'a LoadError),
    Empty,
    Ready,
}

/// Cursor-paginated media feed.
///
/// A load is only issued through one of the `begin_*` guards, which set the
/// in-flight flag; [`complete`](Self::complete) clears it again.
#[derive(Debug, Default)]
pub struct FeedLoader {
    items: FeedAccumulator,
    next_cursor: Option<String>,
    in_flight: Option<FeedRequest>,
    error: Option<LoadError>,
    last_request: Option<FeedRequest>,
    loaded: bool,
}

impl FeedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh load from the first page, discarding accumulated items.
    /// Refused while another request is in flight.
    pub fn begin_initial(&mut self) -> Option<FeedRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        self.items.clear();
        self.next_cursor = None;
        self.error = None;
        self.loaded = false;
        self.start(FeedRequest::Initial)
    }

    /// Start loading the next page. A no-op without a continuation cursor or
    /// while a request is in flight.
    pub fn begin_load_more(&mut self) -> Option<FeedRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let cursor = self.next_cursor.clone()?;
        self.start(FeedRequest::After(cursor))
    }

    /// Re-issue the most recent request if it failed
    pub fn begin_retry(&mut self) -> Option<FeedRequest> {
        if self.in_flight.is_some() || self.error.is_none() {
            return None;
        }
        match self.last_request.clone() {
            Some(FeedRequest::After(cursor)) => {
                self.error = None;
                self.start(FeedRequest::After(cursor))
            }
            Some(FeedRequest::Initial) | None => self.begin_initial(),
        }
    }

    fn start(&mut self, request: FeedRequest) -> Option<FeedRequest> {
        self.in_flight = Some(request.clone());
        self.last_request = Some(request.clone());
        Some(request)
    }

    /// Apply the result of the in-flight request
    pub fn complete(&mut self, result: Result<FeedPage, LoadError>) -> FetchOutcome {
        self.in_flight = None;
        match result {
            Ok(page) => {
                let next_cursor = page.paging.next_cursor().map(str::to_string);
                let added = self.items.extend(page.data);
                self.next_cursor = next_cursor;
                self.error = None;
                self.loaded = true;
                FetchOutcome::Loaded { added }
            }
            Err(err) => {
                self.error = Some(err.clone());
                FetchOutcome::Failed(err)
            }
        }
    }

    /// Fetch the first page
    pub async fn load_initial<A: MediaApi + ?Sized>(&mut self, api: &A, session: &SessionContext) -> FetchOutcome {
        match self.begin_initial() {
            Some(request) => self.fetch(request, api, session).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Fetch the next page if one exists and nothing is in flight
    pub async fn load_more<A: MediaApi + ?Sized>(&mut self, api: &A, session: &SessionContext) -> FetchOutcome {
        match self.begin_load_more() {
            Some(request) => self.fetch(request, api, session).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Retry the most recent failed page
    pub async fn retry<A: MediaApi + ?Sized>(&mut self, api: &A, session: &SessionContext) -> FetchOutcome {
        match self.begin_retry() {
            Some(request) => self.fetch(request, api, session).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Issue a request previously returned by one of the `begin_*` guards
    pub async fn fetch<A: MediaApi + ?Sized>(
        &mut self,
        request: FeedRequest,
        api: &A,
        session: &SessionContext,
    ) -> FetchOutcome {
        let Some(token) = session.current_token() else {
            return self.complete(Err(LoadError::MissingToken));
        };

        let result = api
            .fetch_media_page(&token, request.cursor())
            .await
            .map_err(|e| feed_error(&e));
        if let Err(e) = &result {
            log::warn!(target: "api_calls", "Media page request failed: {}", e);
        }
        self.complete(result)
    }

    pub fn items(&self) -> &[MediaItem] {
        self.items.items()
    }

    /// Items that have something to show; entries without a media URL are hidden
    pub fn visible_items(&self) -> Vec<&MediaItem> {
        self.items.items().iter().filter(|item| item.has_media()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&MediaItem> {
        self.items.get(id)
    }

    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn status(&self) -> FeedStatus<'_> {
        match (&self.in_flight, &self.error) {
            (Some(FeedRequest::Initial), _) => FeedStatus::Loading,
            (Some(FeedRequest::After(_)), _) => FeedStatus::LoadingMore,
            // A failed load-more keeps showing what was already loaded
            (None, Some(err)) if self.items.is_empty() || matches!(err, LoadError::MissingToken) => {
                FeedStatus::Failed(err)
            }
            (None, _) if !self.loaded && self.items.is_empty() => FeedStatus::Idle,
            (None, _) if self.visible_items().is_empty() => FeedStatus::Empty,
            (None, _) => FeedStatus::Ready,
        }
    }

    /// Drop everything, e.g. on logout
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn feed_error(err: &ApiError) -> LoadError {
    match err {
        ApiError::Serialization(_) => LoadError::Transport(FEED_UNEXPECTED_ERROR.to_string()),
        other => LoadError::from_api(other, FEED_FALLBACK_ERROR),
    }
}
