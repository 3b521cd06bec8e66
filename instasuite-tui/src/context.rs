use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

use crate::session::StoredToken;
use crate::storage::StorageAdapter;

/// Source of the current time, injectable so expiry can be tested
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

/// Result of reading the token store
#[derive(Debug, Clone, PartialEq)]
pub enum TokenLookup {
    Valid(String),
    /// A token was stored but its lifetime has passed; it has been removed
    Expired,
    Missing,
}

/// The authenticated session, passed explicitly to everything that needs
/// the bearer token.
///
/// Expiry is checked on every read: an expired token is cleared from storage
/// and reported as absent, so no request ever goes out with a stale token.
pub struct SessionContext {
    storage: Box<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl SessionContext {
    pub fn new(storage: Box<dyn StorageAdapter>, default_ttl: Duration) -> Self {
        Self::with_clock(storage, default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Box<dyn StorageAdapter>, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            default_ttl,
        }
    }

    /// Store `token`, valid for `ttl` from now
    pub fn set(&self, token: &str, ttl: Duration) -> Result<StoredToken> {
        let token = token.trim();
        if token.is_empty() {
            return Err(anyhow!("Refusing to store an empty token"));
        }
        if ttl <= Duration::zero() {
            return Err(anyhow!("Token lifetime must be positive"));
        }

        let stored = StoredToken {
            token: token.to_string(),
            expires_at: self.clock.now() + ttl,
        };
        self.storage.store_token(&stored)?;
        log::info!(
            target: "session",
            "Stored token {} (expires {})",
            redact(&stored.token),
            stored.expires_at.to_rfc3339()
        );
        Ok(stored)
    }

    /// Store `token` with the configured lifetime
    pub fn login(&self, token: &str) -> Result<StoredToken> {
        self.set(token, self.default_ttl)
    }

    /// Read the token, distinguishing "never stored" from "expired"
    pub fn lookup(&self) -> Result<TokenLookup> {
        let Some(stored) = self.storage.load_token()? else {
            return Ok(TokenLookup::Missing);
        };

        if stored.is_expired_at(self.clock.now()) {
            log::info!(target: "session", "Token expired at {}, clearing", stored.expires_at.to_rfc3339());
            self.storage.clear_token()?;
            return Ok(TokenLookup::Expired);
        }

        Ok(TokenLookup::Valid(stored.token))
    }

    /// The current token, or `None` when absent or expired
    pub fn get(&self) -> Result<Option<String>> {
        Ok(match self.lookup()? {
            TokenLookup::Valid(token) => Some(token),
            TokenLookup::Expired | TokenLookup::Missing => None,
        })
    }

    /// Like [`get`](Self::get), but storage failures count as "no token"
    pub fn current_token(&self) -> Option<String> {
        match self.get() {
            Ok(token) => token,
            Err(e) => {
                log::warn!(target: "session", "Failed to read token store: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.clear_token()?;
        log::info!(target: "session", "Cleared stored token");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.storage
            .load_token()
            .ok()
            .flatten()
            .map(|stored| stored.expires_at)
    }

    /// Time left before the token expires; zero once it has
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at()
            .map(|expires_at| (expires_at - self.clock.now()).max(Duration::zero()))
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

/// Render a token for logs without revealing it
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{}…({} chars)", prefix, token.chars().count())
}
