//! Token store holding the current session's credentials

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, CoreResult};
use crate::storage::{SessionStorage, StorageScope};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key of the access token (session scope)
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key of the refresh token (persistent scope)
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Storage key of the access token expiry in epoch milliseconds (persistent scope)
pub const TOKEN_EXPIRY_KEY: &str = "token_expiry";

/// Assumed lifetime of an access token, counted from issuance or refresh
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 30 * 60;

/// Snapshot of the stored session
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Holder of the access token, refresh token and access token expiry
///
/// The expiry is a client-side estimate: it is set a fixed lifetime after the
/// tokens are stored and is never read from the token itself. Anything that
/// cannot be read back as an expiry counts as expired.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
}

impl TokenStore {
    /// Create a store over the given backend, using the system clock
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn SessionStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            lifetime: Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS),
        }
    }

    /// Override the assumed access token lifetime
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Store both tokens and restart the expiry window
    ///
    /// If any write fails the store is cleared, so a failed update never
    /// leaves a new token next to an old expiry.
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) -> CoreResult<()> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| CoreError::invalid_config("token lifetime is out of range"))?;

        if let Err(e) = self.write_tokens(access_token, refresh_token, expires_at) {
            warn!(error = %e, "Failed to store session tokens, clearing session");
            if let Err(clear_err) = self.clear_tokens() {
                warn!(error = %clear_err, "Failed to clear partially stored session");
            }
            return Err(e);
        }

        debug!(%expires_at, "Stored session tokens");
        Ok(())
    }

    fn write_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.storage
            .set(StorageScope::Session, ACCESS_TOKEN_KEY, access_token)?;
        self.storage
            .set(StorageScope::Persistent, REFRESH_TOKEN_KEY, refresh_token)?;
        self.storage.set(
            StorageScope::Persistent,
            TOKEN_EXPIRY_KEY,
            &expires_at.timestamp_millis().to_string(),
        )
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(StorageScope::Session, ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(StorageScope::Persistent, REFRESH_TOKEN_KEY)
    }

    /// Recorded expiry of the access token, if it can be read
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.read(StorageScope::Persistent, TOKEN_EXPIRY_KEY)?;
        let parsed = raw
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis);
        if parsed.is_none() {
            warn!("Ignoring unreadable token expiry");
        }
        parsed
    }

    /// True when no expiry is recorded or the recorded expiry has passed
    pub fn is_token_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires_at) => self.clock.now() > expires_at,
            None => true,
        }
    }

    /// True when a request could be authorized, directly or after a refresh
    pub fn has_session(&self) -> bool {
        self.refresh_token().is_some()
            || (self.access_token().is_some() && !self.is_token_expired())
    }

    pub fn session(&self) -> Session {
        Session {
            access_token: self.access_token(),
            refresh_token: self.refresh_token(),
            expires_at: self.expires_at(),
        }
    }

    /// Remove all stored session values
    ///
    /// Every key is attempted even if an earlier removal fails; the first
    /// failure is returned.
    pub fn clear_tokens(&self) -> CoreResult<()> {
        let results = [
            self.storage.remove(StorageScope::Session, ACCESS_TOKEN_KEY),
            self.storage
                .remove(StorageScope::Persistent, REFRESH_TOKEN_KEY),
            self.storage.remove(StorageScope::Persistent, TOKEN_EXPIRY_KEY),
        ];
        debug!("Cleared session tokens");
        results.into_iter().collect()
    }

    fn read(&self, scope: StorageScope, key: &str) -> Option<String> {
        match self.storage.get(scope, key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session storage");
                None
            }
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
