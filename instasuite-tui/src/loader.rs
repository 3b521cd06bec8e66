use thiserror::Error;

use crate::api::ApiError;

/// Why a profile or feed load did not produce data.
///
/// An empty but successful result is not an error; the loaders report it as
/// their own "nothing here" status.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// No usable token; the user has to log in again
    #[error("Please log in to continue")]
    MissingToken,

    /// The request failed; carries the server message or a fallback
    #[error("{0}")]
    Transport(String),
}

impl LoadError {
    pub fn from_api(err: &ApiError, fallback: &str) -> Self {
        LoadError::Transport(err.user_message(fallback))
    }

    /// Only transport failures offer a retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::Transport(_))
    }
}
