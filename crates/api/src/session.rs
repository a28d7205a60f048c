//! Server-side login sessions.
//!
//! Sessions live in a Moka cache keyed by session id and are evicted after
//! sitting idle. Each entry is behind its own mutex so two requests for the
//! same session apply their steps one after the other.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use nursery_core::auth::{AuthError, AuthSession};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Maximum number of live sessions.
const DEFAULT_CAPACITY: u64 = 10_000;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<AuthSession>>;

/// Store of login sessions.
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<Uuid, SessionHandle>,
    otp_ttl: chrono::Duration,
}

impl SessionStore {
    /// Creates a store whose sessions expire after `idle` without use and
    /// whose passcodes expire after `otp_ttl`.
    #[must_use]
    pub fn new(idle: Duration, otp_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(DEFAULT_CAPACITY)
            .time_to_idle(idle)
            .build();

        Self {
            cache,
            otp_ttl: chrono::Duration::from_std(otp_ttl)
                .unwrap_or_else(|_| chrono::Duration::minutes(5)),
        }
    }

    /// Opens a new session in the `login` step.
    pub async fn open(&self) -> (Uuid, SessionHandle) {
        let session = AuthSession::new(self.otp_ttl, Utc::now());
        let id = session.id;
        let handle = Arc::new(Mutex::new(session));
        self.cache.insert(id, Arc::clone(&handle)).await;
        (id, handle)
    }

    /// Looks up a live session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionNotFound` for unknown or expired ids.
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, AuthError> {
        self.cache.get(&id).await.ok_or(AuthError::SessionNotFound)
    }

    /// Tears a session down.
    pub async fn remove(&self, id: Uuid) {
        self.cache.invalidate(&id).await;
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}
