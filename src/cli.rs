//! Command-line interface definition for Chatpad
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive chat, one-shot sends, and
//! session management.

use clap::{Parser, Subcommand};

/// Chatpad - chat with a hosted text-generation model
///
/// Conversations are kept as chat sessions that persist between runs.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatpad")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the session database location
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Override the inference endpoint URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Chatpad
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat
    Chat {
        /// Start in a new session instead of the most recent one
        #[arg(short, long)]
        new: bool,

        /// Resume a specific session (full id or unique prefix)
        #[arg(short, long, conflicts_with = "new")]
        session: Option<String>,
    },

    /// Send a single message and print the reply
    Send {
        /// Message text
        text: String,

        /// Send into a new session
        #[arg(short, long)]
        new: bool,
    },

    /// Manage stored chat sessions
    Sessions {
        /// Session management subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// List sessions, newest first
    List,

    /// Print the transcript of a session
    Show {
        /// Session id or unique prefix
        id: String,
    },

    /// Create a new empty session
    New,

    /// Delete a session
    Delete {
        /// Session id or unique prefix
        id: String,

        /// Delete without asking for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Rename a session
    Rename {
        /// Session id or unique prefix
        id: String,

        /// New title
        title: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            api_url: None,
            command: Commands::Sessions {
                command: SessionCommand::List,
            },
        }
    }
}
