use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// A bearer token together with the instant it stops being valid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Manages token storage in the user's config directory.
///
/// The token is stored as JSON in `~/.instasuite/session` with 0600
/// permissions so only the owner can read it.
#[derive(Debug, Clone)]
pub struct SessionStore {
    file_path: PathBuf,
}

impl SessionStore {
    /// Creates a SessionStore backed by the given file.
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Loads the stored token.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(token))` if the file exists and holds a well-formed token
    /// - `Ok(None)` if the file doesn't exist or its content is unusable
    /// - `Err(_)` if the file cannot be read
    pub fn load(&self) -> Result<Option<StoredToken>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path).context("Failed to read session file")?;

        if content.trim().is_empty() {
            log::warn!("Session file is empty, treating as no session");
            return Ok(None);
        }

        let stored: StoredToken = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("Session file is corrupted ({}), treating as no session", e);
                return Ok(None);
            }
        };

        let token = stored.token.trim();
        if token.is_empty() || token.len() > 2048 {
            log::warn!("Stored token has invalid length: {}, treating as corrupted", token.len());
            return Ok(None);
        }

        if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
            log::warn!("Stored token contains control characters, treating as corrupted");
            return Ok(None);
        }

        log::debug!("Loaded session token from {}", self.file_path.display());
        Ok(Some(stored))
    }

    /// Saves the token to the file with 0600 permissions.
    ///
    /// Writes go to a temporary file that is renamed into place, and any
    /// stale `session*` siblings are removed first.
    pub fn save(&self, stored: &StoredToken) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        self.cleanup_old_files()?;

        let temp_path = self.file_path.with_extension("tmp");
        let json = serde_json::to_string(stored).context("Failed to serialize session token")?;

        let mut file = fs::File::create(&temp_path).context("Failed to create temporary session file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write session token")?;
        file.sync_all().context("Failed to sync session file to disk")?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&temp_path, permissions)
                .context("Failed to set session file permissions")?;
        }

        fs::rename(&temp_path, &self.file_path).context("Failed to rename temporary session file")?;

        log::info!("Saved session token to {}", self.file_path.display());
        Ok(())
    }

    /// Deletes the session file. Succeeds if the file doesn't exist.
    pub fn delete(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context("Failed to delete session file")?;
            log::info!("Deleted session file at {}", self.file_path.display());
        } else {
            log::debug!("Session file does not exist, nothing to delete");
        }
        Ok(())
    }

    fn cleanup_old_files(&self) -> Result<()> {
        let Some(parent) = self.file_path.parent() else {
            return Ok(());
        };
        if !parent.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(parent).context("Failed to read session directory")? {
            let path = entry.context("Failed to read directory entry")?.path();
            if path == self.file_path {
                continue;
            }

            if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
                if file_name.starts_with("session") {
                    log::debug!("Removing stale session file: {}", path.display());
                    if let Err(e) = fs::remove_file(&path) {
                        log::warn!("Failed to remove stale session file {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.file_path
    }
}
