use instasuite_types::Profile;

use crate::api::{ApiError, MediaApi};
use crate::context::SessionContext;
use crate::loader::LoadError;

const PROFILE_FALLBACK_ERROR: &str = "Failed to fetch profile";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfileStatus<'a> {
    Idle,
    Loading,
    Failed(&'a LoadError),
    /// The request succeeded but the body was not a usable profile
    NoData,
    Ready(&'a Profile),
}

/// Loads the signed-in account's profile once per session
#[derive(Debug, Default)]
pub struct ProfileLoader {
    profile: Option<Profile>,
    loading: bool,
    error: Option<LoadError>,
    loaded: bool,
}

impl ProfileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Apply a fetch result. A body that doesn't decode as a profile is
    /// "no data", not an error.
    pub fn complete(&mut self, result: Result<Profile, LoadError>) {
        self.loading = false;
        self.loaded = true;
        match result {
            Ok(profile) => {
                self.profile = Some(profile);
                self.error = None;
            }
            Err(err) => {
                self.profile = None;
                self.error = Some(err);
            }
        }
    }

    fn complete_without_data(&mut self) {
        self.loading = false;
        self.loaded = true;
        self.profile = None;
        self.error = None;
    }

    /// Fetch the profile with the current session token.
    ///
    /// Without a token this fails immediately and no request is made.
    pub async fn load<A: MediaApi + ?Sized>(&mut self, api: &A, session: &SessionContext) {
        self.begin();
        self.fetch(api, session).await;
    }

    /// Send the request for a load already marked with [`begin`](Self::begin)
    pub async fn fetch<A: MediaApi + ?Sized>(&mut self, api: &A, session: &SessionContext) {
        let Some(token) = session.current_token() else {
            self.complete(Err(LoadError::MissingToken));
            return;
        };

        match api.fetch_profile(&token).await {
            Ok(profile) => {
                log::info!(target: "api_calls", "Loaded profile @{}", profile.username);
                self.complete(Ok(profile));
            }
            Err(ApiError::Serialization(e)) => {
                log::warn!(target: "api_calls", "Profile response was not a profile: {}", e);
                self.complete_without_data();
            }
            Err(e) => {
                log::warn!(target: "api_calls", "Profile request failed: {}", e);
                self.complete(Err(LoadError::from_api(&e, PROFILE_FALLBACK_ERROR)));
            }
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn status(&self) -> ProfileStatus<'_> {
        if self.loading {
            return ProfileStatus::Loading;
        }
        if let Some(err) = &self.error {
            return ProfileStatus::Failed(err);
        }
        match (&self.profile, self.loaded) {
            (Some(profile), _) => ProfileStatus::Ready(profile),
            (None, true) => ProfileStatus::NoData,
            (None, false) => ProfileStatus::Idle,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
