use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::MediaType;

// The platform emits `2023-12-01T10:00:00+0000`, which is not strict RFC3339,
// so fall back to a `%z` parse before giving up.
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}

// Comments arrive either as a bare array or wrapped as `{ "data": [...] }`
// when requested through field expansion.
mod comments_format {
    use serde::{Deserialize, Deserializer};

    use super::Comment;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CommentsField {
        List(Vec<Comment>),
        Wrapped { data: Vec<Comment> },
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<Comment>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let field = Option::<CommentsField>::deserialize(deserializer)?;
        Ok(field.map(|f| match f {
            CommentsField::List(comments) => comments,
            CommentsField::Wrapped { data } => data,
        }))
    }
}

/// Parse a platform timestamp into UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z").map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Authenticated account profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub media_count: u64,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl Profile {
    /// Picture URL, falling back to a generated initials avatar
    pub fn avatar_url(&self) -> String {
        match &self.profile_picture_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!(
                "https://ui-avatars.com/api/?name={}&background=random&bold=true&size=128",
                self.username
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub text: String,
    #[serde(with = "datetime_format")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub media_type: MediaType,
    /// Missing for some album children and copyrighted media
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub permalink: String,
    #[serde(with = "datetime_format")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "comments_format::deserialize", skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

impl MediaItem {
    pub fn comment_count(&self) -> usize {
        self.comments.as_ref().map(|c| c.len()).unwrap_or(0)
    }

    /// Whether the item has something to display
    pub fn has_media(&self) -> bool {
        self.media_url.as_deref().map(|u| !u.is_empty()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub cursors: Option<Cursors>,
    /// Link to the next page; absent on the last page
    #[serde(default)]
    pub next: Option<String>,
}

impl Paging {
    /// Continuation cursor for the following page.
    ///
    /// The platform keeps reporting an `after` cursor on the final page, so
    /// the cursor only counts while a `next` link is present.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next.as_ref()?;
        self.cursors
            .as_ref()
            .and_then(|c| c.after.as_deref())
            .filter(|after| !after.is_empty())
    }
}

/// One page of the media feed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub data: Vec<MediaItem>,
    #[serde(default)]
    pub paging: Paging,
}

/// Error body returned by the API collaborators
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Graph { message: String },
}

impl ErrorDetail {
    pub fn message(&self) -> &str {
        match self {
            ErrorDetail::Message(message) => message,
            ErrorDetail::Graph { message } => message,
        }
    }
}
