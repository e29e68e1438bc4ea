//! Session invalidation events
//!
//! The session core never navigates on its own. When a session ends because
//! the backend rejected it, an event is broadcast and whoever owns the UI
//! decides what to do (redirect to login, show a prompt, exit).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

/// Why a session was invalidated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    /// The refresh endpoint rejected the refresh token or could not be reached
    RefreshFailed,
    /// A request came back with 401
    Unauthorized,
}

/// Emitted after the token store has been cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInvalidated {
    pub reason: InvalidationReason,
}

/// Broadcast channel for [`SessionInvalidated`] events
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionInvalidated>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Subscribe to future invalidation events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionInvalidated> {
        self.sender.subscribe()
    }

    /// Broadcast an invalidation. Having no subscribers is fine.
    pub fn emit(&self, reason: InvalidationReason) {
        let receivers = self.sender.send(SessionInvalidated { reason }).unwrap_or(0);
        tracing::debug!(?reason, receivers, "Session invalidated");
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
