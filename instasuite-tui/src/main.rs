use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use std::sync::Arc;
use std::time::Duration;

use instasuite::api::ApiClient;
use instasuite::app::App;
use instasuite::auth::extract_token;
use instasuite::config::{ConfigManager, SettingsOverrides};
use instasuite::context::{redact, SessionContext};
use instasuite::logging::{self, LogConfig};
use instasuite::storage::{StorageAdapterFactory, StorageMode};
use instasuite::terminal::{self, Tui};
use instasuite::ui;

/// InstaSuite - browse your Instagram profile and media from the terminal
#[derive(Parser)]
#[command(name = "instasuite")]
#[command(about = "A terminal client for your Instagram profile and media")]
#[command(version)]
struct Cli {
    /// Access token, or the full redirect URL carrying `?token=...`
    #[arg(long, env = "INSTASUITE_TOKEN")]
    token: Option<String>,

    /// OAuth client id used to build the authorization URL
    #[arg(long)]
    client_id: Option<String>,

    /// Where the backend redirects after login; the local listener binds it
    #[arg(long)]
    redirect_uri: Option<String>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,

    /// Remove the stored token and exit
    #[arg(long)]
    logout: bool,

    /// Keep the token in memory only
    #[arg(long)]
    ephemeral: bool,
}

// Load environment variables from a .env file so INSTASUITE_* settings can
// live next to the binary
fn load_env() {
    let _ = dotenv::dotenv();
}

/// A `--token` value may be the bare token or the redirect it arrived on
fn token_from_arg(raw: &str) -> Option<String> {
    if raw.contains("token=") {
        extract_token(raw)
    } else {
        Some(raw.trim().to_string()).filter(|t| !t.is_empty())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_env();

    let log_config = LogConfig::for_cli(cli.verbose);
    logging::init_logging(&log_config)?;

    let config_manager = ConfigManager::new()?;
    let settings = config_manager.load_settings(&SettingsOverrides {
        client_id: cli.client_id.clone(),
        redirect_uri: cli.redirect_uri.clone(),
    })?;

    let storage_mode = if cli.ephemeral {
        StorageMode::Ephemeral
    } else {
        StorageMode::Persistent(config_manager.session_file())
    };
    let session = SessionContext::new(StorageAdapterFactory::create_adapter(&storage_mode), settings.token_ttl());

    if cli.logout {
        session.clear()?;
        println!("Logged out.");
        return Ok(());
    }

    if let Some(raw) = cli.token.as_deref() {
        let token = token_from_arg(raw).context("--token did not contain a token")?;
        let stored = session.login(&token)?;
        log::info!(
            "Using token {} from the command line, valid until {}",
            redact(&stored.token),
            stored.expires_at.to_rfc3339()
        );
    }

    let api = Arc::new(ApiClient::from_settings(&settings));
    let mut app = App::new(api, session, settings);
    app.log_config = log_config;

    let mut tui = terminal::init()?;
    let result = run(&mut tui, &mut app).await;
    app.login.cancel();
    terminal::restore()?;

    if let Err(e) = &result {
        log::error!("Exited with error: {:#}", e);
    }
    result
}

async fn run(tui: &mut Tui, app: &mut App) -> Result<()> {
    while app.running {
        // Token handed over by the callback listener
        if let Err(e) = app.poll_login() {
            log::error!("Failed to accept token: {:#}", e);
            app.login.error = Some(e.to_string());
        }

        app.queue_tab_data_load();

        app.clear_expired_messages();

        tui.draw(|frame| ui::render(app, frame))?;

        // Run queued work once the UI has drawn its current state
        if !app.pending.is_empty() {
            app.run_pending().await?;
            continue;
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Err(e) = app.handle_key_event(key) {
                        log::error!("Key handling failed: {:#}", e);
                        app.set_status(format!("Error: {}", e));
                    }
                }
                // Keyboard-only; everything else just triggers a redraw
                _ => {}
            }
        }
    }

    Ok(())
}
