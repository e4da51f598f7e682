use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Title given to a session until its first user message names it
pub const DEFAULT_TITLE: &str = "New Chat";

/// Assistant greeting every new session starts with
pub const GREETING_TEXT: &str = "Hi! I'm your AI assistant. How can I help you today?";

/// Number of characters of the first user message used as the title
pub const TITLE_MAX_CHARS: usize = 30;

/// A single chat message
///
/// Serialized with camelCase field names and RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier (ULID)
    pub id: String,
    /// Message body
    pub text: String,
    /// Whether the user wrote this message
    pub is_user: bool,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with a fresh id and the current time
    pub fn new(text: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            is_user,
            timestamp: Utc::now(),
        }
    }

    /// Create a message written by the user
    ///
    /// # Examples
    ///
    /// ```
    /// use chatpad::session::Message;
    ///
    /// let msg = Message::user("Hello");
    /// assert!(msg.is_user);
    /// assert_eq!(msg.text, "Hello");
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    /// Create a message produced by the assistant
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    /// The greeting that seeds every session
    pub fn greeting() -> Self {
        Self::assistant(GREETING_TEXT)
    }
}

/// One conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique session identifier (ULID)
    pub id: String,
    /// Display title
    pub title: String,
    /// Messages in insertion order
    pub messages: Vec<Message>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When a message was last appended
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Create a session holding only the greeting, titled [`DEFAULT_TITLE`]
    ///
    /// # Examples
    ///
    /// ```
    /// use chatpad::session::{ChatSession, DEFAULT_TITLE};
    ///
    /// let session = ChatSession::new();
    /// assert_eq!(session.title, DEFAULT_TITLE);
    /// assert_eq!(session.messages.len(), 1);
    /// assert!(!session.messages[0].is_user);
    /// ```
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: DEFAULT_TITLE.to_string(),
            messages: vec![Message::greeting()],
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether any message in the session came from the user
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.is_user)
    }

    /// The most recent message, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Listing view of a session, without its messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Session identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Number of messages, greeting included
    pub message_count: usize,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When a message was last appended
    pub updated_at: DateTime<Utc>,
    /// Whether this is the current session
    pub is_current: bool,
}

/// Generate a new sortable unique id
pub fn new_id() -> String {
    Ulid::new().to_string()
}

/// Title derived from a user message: the leading [`TITLE_MAX_CHARS`]
/// characters, with `...` appended when the text was cut
///
/// # Examples
///
/// ```
/// use chatpad::session::derive_title;
///
/// assert_eq!(derive_title("Short question"), "Short question");
/// assert_eq!(
///     derive_title("This message is definitely longer than thirty characters"),
///     "This message is definitely lon..."
/// );
/// ```
pub fn derive_title(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
