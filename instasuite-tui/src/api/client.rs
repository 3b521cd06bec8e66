use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult};
use crate::config::ClientSettings;
use instasuite_types::*;

/// Field selection sent with every feed request: the item attributes plus up
/// to ten comments per item.
pub const MEDIA_FIELDS: &str =
    "id,caption,media_type,media_url,thumbnail_url,permalink,timestamp,comments.limit(10){id,text,username,timestamp}";

/// Remote data source for the profile and media loaders
#[async_trait]
pub trait MediaApi: Send + Sync {
    /// Fetch the authenticated account's profile
    async fn fetch_profile(&self, token: &str) -> ApiResult<Profile>;

    /// Fetch one page of media, resuming after `cursor` when given
    async fn fetch_media_page(&self, token: &str, cursor: Option<&str>) -> ApiResult<FeedPage>;
}

/// HTTP client for the profile and media collaborators.
///
/// The bearer token is supplied per call by the session context; the client
/// itself holds no credentials.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    profile_url: String,
    media_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(profile_url: impl Into<String>, media_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            profile_url: profile_url.into(),
            media_url: media_url.into(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(settings.profile_url.clone(), settings.media_url.clone())
    }

    /// Helper to add the bearer token to a request
    fn add_auth_header(&self, req: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        req.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token))
    }

    /// Helper to handle API responses
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            // Decode from text so a malformed body surfaces as a serialization
            // error rather than a transport one
            let body = response.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            let clean_error = extract_error_message(&error_text, status.as_u16());

            match status.as_u16() {
                404 => Err(ApiError::NotFound(clean_error)),
                401 | 403 => Err(ApiError::Unauthorized(clean_error)),
                400 => Err(ApiError::BadRequest(clean_error)),
                _ => Err(ApiError::Api(clean_error)),
            }
        }
    }

    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }
}

#[async_trait]
impl MediaApi for ApiClient {
    async fn fetch_profile(&self, token: &str) -> ApiResult<Profile> {
        log::debug!(target: "api_calls", "GET {}", self.profile_url);
        let req = self.add_auth_header(self.client.get(&self.profile_url), token);
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn fetch_media_page(&self, token: &str, cursor: Option<&str>) -> ApiResult<FeedPage> {
        log::debug!(target: "api_calls", "GET {} (after={:?})", self.media_url, cursor);
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(after) = cursor {
            params.push(("after", after));
        }
        params.push(("fields", MEDIA_FIELDS));

        let req = self.add_auth_header(self.client.get(&self.media_url).query(&params), token);
        let response = req.send().await?;
        self.handle_response(response).await
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"error": "..."}` and the Graph style `{"error": {"message": ...}}`.
/// HTML error pages (proxies, CDNs) become a generic status line.
fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return parsed.error.message().to_string();
    }

    if body.contains("<html") || body.contains("<!DOCTYPE") {
        return format!("Server returned {} error.", status);
    }

    body.trim().to_string()
}
