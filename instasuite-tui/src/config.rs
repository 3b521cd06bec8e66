use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Permission scopes requested during authorization
pub const DEFAULT_SCOPES: &[&str] = &[
    "instagram_business_basic",
    "instagram_business_content_publish",
    "instagram_business_manage_messages",
    "instagram_business_manage_comments",
];

pub const DEFAULT_AUTHORIZE_URL: &str = "https://api.instagram.com/oauth/authorize";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8765/callback";
pub const DEFAULT_PROFILE_URL: &str = "https://www.eduvia.space/api/instagram-profile";
pub const DEFAULT_MEDIA_URL: &str = "https://www.eduvia.space/api/instagram-media";

/// One hour, matching the lifetime of a freshly issued token
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

const SETTINGS_FILE: &str = "settings.toml";

/// Client settings resolved from defaults, settings files and the environment
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub client_id: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub profile_url: String,
    pub media_url: String,
    pub token_ttl_secs: u64,
    pub scopes: Vec<String>,
}

/// Values given on the command line; these win over every other source
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            media_url: DEFAULT_MEDIA_URL.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClientSettings {
    /// Load settings with this priority (highest last):
    /// 1. Built-in defaults
    /// 2. `settings.toml` in the config directory
    /// 3. `settings.toml` in the current directory
    /// 4. `INSTASUITE_*` environment variables
    /// 5. Command-line overrides
    pub fn load(config_dir: &Path, overrides: &SettingsOverrides) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("client_id", defaults.client_id)?
            .set_default("redirect_uri", defaults.redirect_uri)?
            .set_default("authorize_url", defaults.authorize_url)?
            .set_default("profile_url", defaults.profile_url)?
            .set_default("media_url", defaults.media_url)?
            .set_default("token_ttl_secs", defaults.token_ttl_secs)?
            .set_default("scopes", defaults.scopes)?;

        let user_file = config_dir.join(SETTINGS_FILE);
        if user_file.exists() {
            builder = builder.add_source(File::from(user_file).required(false));
        }

        let local_file = PathBuf::from(SETTINGS_FILE);
        if local_file.exists() {
            builder = builder.add_source(File::from(local_file).required(false));
        }

        for (var, key) in [
            ("INSTASUITE_CLIENT_ID", "client_id"),
            ("INSTASUITE_REDIRECT_URI", "redirect_uri"),
            ("INSTASUITE_AUTHORIZE_URL", "authorize_url"),
            ("INSTASUITE_PROFILE_URL", "profile_url"),
            ("INSTASUITE_MEDIA_URL", "media_url"),
            ("INSTASUITE_TOKEN_TTL_SECS", "token_ttl_secs"),
        ] {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        if let Some(client_id) = &overrides.client_id {
            builder = builder.set_override("client_id", client_id.clone())?;
        }
        if let Some(redirect_uri) = &overrides.redirect_uri {
            builder = builder.set_override("redirect_uri", redirect_uri.clone())?;
        }

        let settings: Self = builder
            .build()
            .context("Failed to assemble client settings")?
            .try_deserialize()
            .context("Failed to parse client settings")?;

        if settings.token_ttl_secs == 0 {
            anyhow::bail!("token_ttl_secs must be greater than zero");
        }

        Ok(settings)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.token_ttl_secs.min(i64::MAX as u64) as i64)
    }

    /// Scopes joined the way the authorization endpoint expects them
    pub fn scope_param(&self) -> String {
        self.scopes.join(",")
    }

    pub fn has_client_id(&self) -> bool {
        !self.client_id.trim().is_empty()
    }
}

/// Owns the `~/.instasuite` directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a config manager rooted at `~/.instasuite`
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Could not determine home directory")?;
        Self::with_dir(home_dir.join(".instasuite"))
    }

    /// Create a config manager rooted at an explicit directory
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create .instasuite directory")?;
        }
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the persisted token file
    pub fn session_file(&self) -> PathBuf {
        self.config_dir.join("session")
    }

    pub fn load_settings(&self, overrides: &SettingsOverrides) -> Result<ClientSettings> {
        ClientSettings::load(&self.config_dir, overrides)
    }
}
