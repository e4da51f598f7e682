//! The send-a-message flow
//!
//! [`ChatService`] ties the session store to an inference backend: the user
//! message is appended first, then the backend's reply (or its fallback
//! text) is appended to the same session.

use crate::config::ChatConfig;
use crate::inference::InferenceBackend;
use crate::session::{Message, SessionStore};
use std::sync::Arc;

/// Chat front door used by the interactive and one-shot commands
pub struct ChatService {
    store: SessionStore,
    backend: Arc<dyn InferenceBackend>,
    max_message_length: usize,
}

impl ChatService {
    /// Combine a loaded session store with a backend
    pub fn new(store: SessionStore, backend: Arc<dyn InferenceBackend>, config: &ChatConfig) -> Self {
        Self {
            store,
            backend,
            max_message_length: config.max_message_length,
        }
    }

    /// Send `text` as a user message in the current session
    ///
    /// Returns the reply message appended to the session, or `None` when the
    /// input is blank. Input longer than the configured limit is cut to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_trait::async_trait;
    /// use chatpad::chat::ChatService;
    /// use chatpad::config::ChatConfig;
    /// use chatpad::inference::InferenceBackend;
    /// use chatpad::session::SessionStore;
    /// use chatpad::storage::{MemoryStore, SESSIONS_KEY};
    /// use std::sync::Arc;
    ///
    /// struct Shout;
    ///
    /// #[async_trait]
    /// impl InferenceBackend for Shout {
    ///     async fn send_message(&self, text: &str) -> String {
    ///         text.to_uppercase()
    ///     }
    /// }
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let store = SessionStore::load(Arc::new(MemoryStore::new()), SESSIONS_KEY);
    /// let mut chat = ChatService::new(store, Arc::new(Shout), &ChatConfig::default());
    ///
    /// let reply = chat.send("hello").await.unwrap();
    /// assert_eq!(reply.text, "HELLO");
    /// assert!(chat.send("   ").await.is_none());
    /// # }
    /// ```
    pub async fn send(&mut self, text: &str) -> Option<Message> {
        let text = prepare_input(text, self.max_message_length)?;

        self.store.add_message(Message::user(text.clone()));
        let reply = self.backend.send_message(&text).await;

        let message = Message::assistant(reply);
        self.store.add_message(message.clone());
        Some(message)
    }

    /// The session store
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The session store, for session management commands
    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// Text exchanged with the backend in this run
    pub fn history(&self) -> Vec<String> {
        self.backend.history()
    }

    /// Forget the backend's exchange log
    pub fn clear_history(&self) {
        self.backend.clear_history();
    }

    /// Wait for pending session writes
    pub async fn flush(&self) {
        self.store.flush().await;
    }
}

/// Trim `text` and cut it to `max_chars`; `None` when nothing remains
pub fn prepare_input(text: &str, max_chars: usize) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().count() > max_chars {
        tracing::debug!("Truncating input to {} characters", max_chars);
        Some(trimmed.chars().take(max_chars).collect())
    } else {
        Some(trimmed.to_string())
    }
}
