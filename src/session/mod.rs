//! Chat session persistence
//!
//! [`SessionStore`] owns every chat session and the pointer to the current
//! one. All mutations apply to memory synchronously and then hand a snapshot
//! of the full session list to a [`PersistenceWriter`], which stores it as a
//! single JSON blob. Loading never fails: missing or corrupt state falls back
//! to one fresh session.

use crate::error::{ChatpadError, Result};
use crate::storage::{KeyValueStore, PersistenceWriter};
use chrono::Utc;
use std::sync::Arc;

pub mod types;
pub use types::{
    derive_title, new_id, ChatSession, Message, SessionSummary, DEFAULT_TITLE, GREETING_TEXT,
    TITLE_MAX_CHARS,
};

/// Owner of all chat sessions and the current-session pointer
///
/// Sessions are ordered newest first. The current session is tracked by id
/// and always refers to an element of the list while the list is non-empty.
///
/// # Examples
///
/// ```
/// use chatpad::session::{Message, SessionStore};
/// use chatpad::storage::{MemoryStore, SESSIONS_KEY};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut store = SessionStore::load(Arc::new(MemoryStore::new()), SESSIONS_KEY);
/// assert_eq!(store.len(), 1);
///
/// store.add_message(Message::user("What is Rust?"));
/// assert_eq!(store.current_session().unwrap().title, "What is Rust?");
/// store.flush().await;
/// # }
/// ```
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    current: Option<String>,
    writer: PersistenceWriter,
}

impl SessionStore {
    /// Restore sessions from `storage`, bootstrapping a default session when
    /// nothing usable is stored
    ///
    /// The first (newest) stored session becomes current.
    pub fn load(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let loaded = read_sessions(storage.as_ref(), &key);
        let writer = PersistenceWriter::spawn(storage, key);

        let mut store = Self {
            sessions: Vec::new(),
            current: None,
            writer,
        };

        match loaded {
            Ok(Some(sessions)) if !sessions.is_empty() => {
                tracing::info!("Loaded {} chat sessions", sessions.len());
                store.sessions = sessions;
                store.current = store.sessions.first().map(|s| s.id.clone());
                if store.reseed_empty_sessions() {
                    store.persist();
                }
            }
            Ok(_) => {
                tracing::info!("No stored chat sessions, starting a new one");
                store.bootstrap();
            }
            Err(e) => {
                tracing::warn!("Failed to load chat sessions, starting fresh: {}", e);
                store.bootstrap();
            }
        }

        store
    }

    /// Start a new session and make it current
    pub fn create_session(&mut self) -> &ChatSession {
        let session = ChatSession::new();
        tracing::debug!("Created session {}", session.id);

        self.current = Some(session.id.clone());
        self.sessions.insert(0, session);
        self.persist();

        &self.sessions[0]
    }

    /// Make the session with `id` current
    ///
    /// Returns `false` and leaves the current session unchanged when no
    /// session has that id.
    pub fn select_session(&mut self, id: &str) -> bool {
        if self.sessions.iter().any(|s| s.id == id) {
            self.current = Some(id.to_string());
            true
        } else {
            tracing::debug!("select_session: no session {}", id);
            false
        }
    }

    /// Remove the session with `id`
    ///
    /// Deleting the current session selects the newest remaining one, or a
    /// freshly created session when none remain. Returns `false` when no
    /// session has that id.
    pub fn delete_session(&mut self, id: &str) -> bool {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            tracing::debug!("delete_session: no session {}", id);
            return false;
        };

        self.sessions.remove(index);
        tracing::debug!("Deleted session {}", id);

        if self.current.as_deref() == Some(id) {
            match self.sessions.first() {
                Some(next) => self.current = Some(next.id.clone()),
                None => {
                    let session = ChatSession::new();
                    self.current = Some(session.id.clone());
                    self.sessions.push(session);
                }
            }
        }

        self.persist();
        true
    }

    /// Append `message` to the current session
    ///
    /// Bumps the session's `updated_at`. The first user message of a session
    /// still carrying [`DEFAULT_TITLE`] names the session.
    pub fn add_message(&mut self, message: Message) {
        let Some(current_id) = self.current.clone() else {
            tracing::warn!("add_message called with no current session");
            return;
        };
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == current_id) else {
            tracing::warn!("Current session {} is missing", current_id);
            return;
        };

        if message.is_user && !session.has_user_message() && session.title == DEFAULT_TITLE {
            session.title = derive_title(&message.text);
        }
        session.messages.push(message);
        session.updated_at = Utc::now();

        self.persist();
    }

    /// Set the title of the session with `id`
    ///
    /// Returns `false` when no session has that id.
    pub fn update_session_title(&mut self, id: &str, title: impl Into<String>) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                session.title = title.into();
                self.persist();
                true
            }
            None => false,
        }
    }

    /// All sessions, newest first
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// The session being displayed and appended to
    pub fn current_session(&self) -> Option<&ChatSession> {
        let id = self.current.as_deref()?;
        self.get_session(id)
    }

    /// Look up a session by exact id
    pub fn get_session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Listing view of every session, newest first
    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .map(|s| SessionSummary {
                id: s.id.clone(),
                title: s.title.clone(),
                message_count: s.messages.len(),
                created_at: s.created_at,
                updated_at: s.updated_at,
                is_current: self.current.as_deref() == Some(s.id.as_str()),
            })
            .collect()
    }

    /// Resolve a full session id or a unique id prefix to a full id
    ///
    /// # Errors
    ///
    /// Returns `ChatpadError::SessionNotFound` when nothing matches and
    /// `ChatpadError::AmbiguousSessionId` when the prefix matches several
    /// sessions.
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        if self.sessions.iter().any(|s| s.id == prefix) {
            return Ok(prefix.to_string());
        }

        let prefix_upper = prefix.to_uppercase();
        let matches: Vec<&ChatSession> = if prefix.is_empty() {
            Vec::new()
        } else {
            self.sessions
                .iter()
                .filter(|s| s.id.to_uppercase().starts_with(&prefix_upper))
                .collect()
        };

        match matches.as_slice() {
            [] => Err(ChatpadError::SessionNotFound(prefix.to_string()).into()),
            [only] => Ok(only.id.clone()),
            many => Err(ChatpadError::AmbiguousSessionId {
                prefix: prefix.to_string(),
                count: many.len(),
            }
            .into()),
        }
    }

    /// Number of sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether there are no sessions
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Wait for all queued persistence writes to land
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    fn bootstrap(&mut self) {
        let session = ChatSession::new();
        self.current = Some(session.id.clone());
        self.sessions = vec![session];
        self.persist();
    }

    fn reseed_empty_sessions(&mut self) -> bool {
        let mut changed = false;
        for session in self.sessions.iter_mut().filter(|s| s.messages.is_empty()) {
            tracing::warn!("Session {} had no messages, adding greeting", session.id);
            session.messages.push(Message::greeting());
            changed = true;
        }
        changed
    }

    fn persist(&self) {
        match serde_json::to_string(&self.sessions) {
            Ok(snapshot) => self.writer.submit(snapshot),
            Err(e) => tracing::error!("Failed to serialize chat sessions: {}", e),
        }
    }
}

fn read_sessions(storage: &dyn KeyValueStore, key: &str) -> Result<Option<Vec<ChatSession>>> {
    match storage.get(key)? {
        Some(blob) => {
            let sessions = serde_json::from_str(&blob)
                .map_err(|e| ChatpadError::Storage(format!("Deserialization failed: {}", e)))?;
            Ok(Some(sessions))
        }
        None => Ok(None),
    }
}
