// ABOUTME: Owned conversation state: which agent is active and the message history, keyed by thread id.
// ABOUTME: SessionStore holds sessions in memory with one lock per session so turns on a thread serialize.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use ulid::Ulid;

use crate::message::Message;

/// State of a single conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub thread_id: Ulid,
    pub active_agent: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Start a new, empty conversation with the given agent active.
    pub fn new(thread_id: Ulid, active_agent: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            thread_id,
            active_agent: active_agent.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Bump `updated_at` after a committed change.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Shared handle to one session. Holding the lock grants exclusive
/// read/write access for the duration of a turn.
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory session registry. Cloning shares the same underlying map.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Ulid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a fresh session, returning a snapshot of it.
    pub async fn create(&self, active_agent: &str) -> Session {
        let session = Session::new(Ulid::new(), active_agent);
        let snapshot = session.clone();
        self.sessions
            .write()
            .await
            .insert(session.thread_id, Arc::new(Mutex::new(session)));
        tracing::debug!(thread_id = %snapshot.thread_id, active_agent, "session created");
        snapshot
    }

    /// Look up the handle for a thread.
    pub async fn get(&self, thread_id: &Ulid) -> Option<SessionHandle> {
        self.sessions.read().await.get(thread_id).cloned()
    }

    /// Clone the current state of a thread without keeping it locked.
    pub async fn snapshot(&self, thread_id: &Ulid) -> Option<Session> {
        let handle = self.get(thread_id).await?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Whether `handle` is still the registered session for `thread_id`.
    /// A turn that waited on a session lock checks this before running.
    pub async fn is_registered(&self, thread_id: &Ulid, handle: &SessionHandle) -> bool {
        self.sessions
            .read()
            .await
            .get(thread_id)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    /// Drop a thread. Returns false if it did not exist.
    ///
    /// Waits for an in-flight turn on the thread to finish, and removes the
    /// thread while still holding its lock.
    pub async fn remove(&self, thread_id: &Ulid) -> bool {
        let Some(handle) = self.get(thread_id).await else {
            return false;
        };
        let _session = handle.lock().await;

        let mut sessions = self.sessions.write().await;
        let removed = match sessions.get(thread_id) {
            Some(current) if Arc::ptr_eq(current, &handle) => {
                sessions.remove(thread_id);
                true
            }
            _ => false,
        };
        if removed {
            tracing::debug!(thread_id = %thread_id, "session removed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
