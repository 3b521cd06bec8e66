use anyhow::{Context, Result};
use reqwest::Url;

use crate::config::ClientSettings;

/// Query parameter the backend uses to hand the token back after login
pub const TOKEN_PARAM: &str = "token";

/// Builds the provider's authorization URL and hands it to the browser.
///
/// The token exchange happens on the backend; it finishes by redirecting the
/// browser to `redirect_uri?token=...`, which [`extract_token`] reads.
pub struct AuthFlow {
    authorize_url: String,
    client_id: String,
    redirect_uri: String,
    scope: String,
}

impl AuthFlow {
    pub fn new(settings: &ClientSettings) -> Self {
        Self {
            authorize_url: settings.authorize_url.clone(),
            client_id: settings.client_id.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            scope: settings.scope_param(),
        }
    }

    /// `{authorize_url}?client_id=..&redirect_uri=..&response_type=code&scope=..`
    ///
    /// Scopes are comma-joined, and every parameter value is URL-encoded.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.authorize_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope)
        )
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Open the system browser at the authorization URL
    pub fn open_browser(&self) -> Result<String> {
        let url = self.authorization_url();
        log::info!(target: "session", "Opening browser for authorization");
        webbrowser::open(&url).context("Failed to open browser")?;
        Ok(url)
    }
}

/// Pull the `token` query parameter out of a redirect.
///
/// Accepts a full URL, a path with a query string, or a bare query string
/// (with or without the leading `?`). Blank tokens are treated as absent.
pub fn extract_token(redirect: &str) -> Option<String> {
    let redirect = redirect.trim();
    if redirect.is_empty() {
        return None;
    }

    let url = match Url::parse(redirect) {
        Ok(url) => url,
        Err(_) => {
            let base = Url::parse("http://localhost/").ok()?;
            let relative = if redirect.starts_with('/') || redirect.starts_with('?') {
                redirect.to_string()
            } else if redirect.contains('=') && !redirect.contains('?') {
                format!("?{}", redirect)
            } else {
                format!("/{}", redirect)
            };
            base.join(&relative).ok()?
        }
    };

    url.query_pairs()
        .find(|(key, _)| key == TOKEN_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|token| !token.is_empty())
}
