use anyhow::{anyhow, bail, Context, Result};
use axum::{
    extract::{OriginalUri, Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use reqwest::Url;
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::auth::TOKEN_PARAM;

const WAITING_PAGE: &str = "<!doctype html><html><body>\
<h2>No token received</h2><p>Finish logging in from the terminal and try again.</p>\
</body></html>";

/// Local HTTP listener that receives the post-login redirect.
///
/// Every request gets a small HTML page back. The first request whose query
/// carries a non-empty `token` shuts the server down and the token is sent
/// on the channel returned by [`spawn`](Self::spawn).
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

#[derive(Clone)]
struct CallbackState {
    tokens: mpsc::Sender<String>,
}

impl CallbackListener {
    /// Bind the host, port and path of `redirect_uri`
    pub async fn bind(redirect_uri: &str) -> Result<Self> {
        let url = Url::parse(redirect_uri).context("Invalid redirect URI")?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("Redirect URI has no host: {}", redirect_uri))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| anyhow!("Redirect URI has no port: {}", redirect_uri))?;
        // Route syntax characters can't appear in a literal path
        if url.path().contains(&[':', '*', '{', '}'][..]) {
            bail!("Unsupported redirect path: {}", url.path());
        }

        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to listen on {}:{}", host, port))?;

        Ok(Self {
            listener,
            path: url.path().to_string(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start serving in the background
    pub fn spawn(self) -> (mpsc::Receiver<String>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            match self.run().await {
                Ok(token) => {
                    let _ = tx.send(token).await;
                }
                Err(e) => log::error!(target: "session", "Callback listener stopped: {:#}", e),
            }
        });
        (rx, handle)
    }

    /// Serve until a request delivers a token
    pub async fn run(self) -> Result<String> {
        log::info!(target: "session", "Waiting for login redirect on {}{}", self.local_addr()?, self.path);

        let (tokens, mut received) = mpsc::channel::<String>(1);
        let (done_tx, done_rx) = oneshot::channel();
        let shutdown = async move {
            if let Some(token) = received.recv().await {
                let _ = done_tx.send(token);
            }
        };

        let app = Router::new()
            .route(&self.path, get(receive_token))
            .fallback(waiting)
            .with_state(CallbackState { tokens });

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Callback server failed")?;

        done_rx
            .await
            .map_err(|_| anyhow!("Callback server stopped before a token arrived"))
    }
}

async fn receive_token(
    State(state): State<CallbackState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    let token = params.get(TOKEN_PARAM).map(|t| t.trim()).filter(|t| !t.is_empty());
    let Some(token) = token else {
        log::debug!(target: "session", "Callback request for {} without a token", uri.path());
        return waiting().await;
    };

    // Only the first token counts; later ones find the channel full
    if state.tokens.try_send(token.to_string()).is_ok() {
        log::info!(target: "session", "Received token on {}", uri.path());
    }
    (StatusCode::OK, Html(success_page(uri.path())))
}

async fn waiting() -> (StatusCode, Html<String>) {
    (StatusCode::BAD_REQUEST, Html(WAITING_PAGE.to_string()))
}

/// Confirmation page; it swaps the address bar to the callback URL without its query
fn success_page(clean_path: &str) -> String {
    format!(
        "<!doctype html><html><head><script>history.replaceState(null, '', '{}');</script></head><body>\
<h2>Logged in to InstaSuite</h2><p>You can close this tab and return to the terminal.</p></body></html>",
        clean_path
    )
}
