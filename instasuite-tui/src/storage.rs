use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::session::{SessionStore, StoredToken};

/// Trait for storage adapters that hold the bearer token
pub trait StorageAdapter: Send + Sync {
    /// Store the token, replacing any previous one
    fn store_token(&self, token: &StoredToken) -> Result<()>;

    /// Load the stored token, expired or not
    fn load_token(&self) -> Result<Option<StoredToken>>;

    /// Remove the stored token
    fn clear_token(&self) -> Result<()>;
}

/// File-based adapter; the token survives restarts until it expires
#[derive(Debug, Clone)]
pub struct FileStorageAdapter {
    session_store: SessionStore,
}

impl FileStorageAdapter {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            session_store: SessionStore::new(file_path),
        }
    }
}

impl StorageAdapter for FileStorageAdapter {
    fn store_token(&self, token: &StoredToken) -> Result<()> {
        self.session_store.save(token)
    }

    fn load_token(&self) -> Result<Option<StoredToken>> {
        self.session_store.load()
    }

    fn clear_token(&self) -> Result<()> {
        self.session_store.delete()
    }
}

/// In-memory adapter; the token lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStorageAdapter {
    slot: Mutex<Option<StoredToken>>,
}

impl MemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorageAdapter {
    fn store_token(&self, token: &StoredToken) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| anyhow!("token slot poisoned"))?;
        *slot = Some(token.clone());
        Ok(())
    }

    fn load_token(&self) -> Result<Option<StoredToken>> {
        let slot = self.slot.lock().map_err(|_| anyhow!("token slot poisoned"))?;
        Ok(slot.clone())
    }

    fn clear_token(&self) -> Result<()> {
        let mut slot = self.slot.lock().map_err(|_| anyhow!("token slot poisoned"))?;
        *slot = None;
        Ok(())
    }
}

/// Where the token is kept
#[derive(Debug, Clone, PartialEq)]
pub enum StorageMode {
    /// Token file in the config directory
    Persistent(PathBuf),
    /// Process memory only (`--ephemeral`)
    Ephemeral,
}

/// Factory for creating storage adapters based on mode
pub struct StorageAdapterFactory;

impl StorageAdapterFactory {
    pub fn create_adapter(mode: &StorageMode) -> Box<dyn StorageAdapter> {
        match mode {
            StorageMode::Persistent(path) => Box::new(FileStorageAdapter::new(path.clone())),
            StorageMode::Ephemeral => Box::new(MemoryStorageAdapter::new()),
        }
    }
}
