//! Chatpad - chat client library
//!
//! This library provides the core of a chat client that talks to a hosted
//! text-generation endpoint and keeps conversations as persistent sessions.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Chat sessions, messages, and the session store
//! - `storage`: Key-value storage port, sled backend, and background writer
//! - `inference`: Inference endpoint client and reply normalization
//! - `chat`: The send-a-message flow tying sessions to the endpoint
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers for the CLI commands
//!
//! # Example
//!
//! ```no_run
//! use chatpad::{ChatService, Config, InferenceClient, SessionStore};
//! use chatpad::storage::SledStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = SessionStore::load(Arc::new(SledStore::open_default()?), "chatSessions");
//!     let client = InferenceClient::new(config.inference.clone())?;
//!     let mut chat = ChatService::new(store, Arc::new(client), &config.chat);
//!
//!     if let Some(reply) = chat.send("Hello!").await {
//!         println!("{}", reply.text);
//!     }
//!     chat.flush().await;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod inference;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use chat::ChatService;
pub use config::Config;
pub use error::{ChatpadError, Result};
pub use inference::{InferenceBackend, InferenceClient};
pub use session::{ChatSession, Message, SessionStore};
