/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes three top-level command modules:

- `chat`     — Interactive chat
- `send`     — Send one message and print the reply
- `sessions` — Session management (list, show, new, delete, rename)
*/

use crate::chat::ChatService;
use crate::config::Config;
use crate::error::Result;
use crate::inference::{InferenceBackend, InferenceClient};
use crate::session::SessionStore;
use crate::storage::{KeyValueStore, SledStore};
use std::sync::Arc;

// Special commands parser for the chat loop
pub mod special_commands;

// Session table and transcript output
pub mod sessions;

/// Open the configured session database and load the sessions in it
///
/// # Errors
///
/// Returns error if the database cannot be opened
pub fn open_session_store(config: &Config) -> Result<SessionStore> {
    let storage = match &config.storage.path {
        Some(path) => SledStore::new(path)?,
        None => SledStore::open_default()?,
    };
    tracing::debug!("Using session database at {}", storage.path().display());

    let storage: Arc<dyn KeyValueStore> = Arc::new(storage);
    Ok(SessionStore::load(storage, config.storage.key.clone()))
}

/// Build the chat service for a loaded store from configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be created
pub fn build_chat_service(config: &Config, store: SessionStore) -> Result<ChatService> {
    let client = InferenceClient::new(config.inference.clone())?;
    let backend: Arc<dyn InferenceBackend> = Arc::new(client);
    Ok(ChatService::new(store, backend, &config.chat))
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Loads the session store, connects the inference client, and runs a
    //! readline-based loop that sends plain lines to the model and handles
    //! slash commands locally.

    use super::*;
    use crate::commands::sessions::{confirm_delete, print_sessions_table, print_transcript};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `new_session` - Start in a fresh session instead of the newest one
    /// * `session` - Resume a specific session (id or unique prefix)
    ///
    /// # Examples
    ///
    /// ```
    /// use chatpad::commands::chat;
    /// use chatpad::config::Config;
    ///
    /// // In application code:
    /// // chat::run_chat(Config::default(), false, None).await?;
    /// ```
    pub async fn run_chat(config: Config, new_session: bool, session: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let mut store = open_session_store(&config)?;
        if new_session {
            store.create_session();
        } else if let Some(prefix) = session {
            let id = store.resolve_id(&prefix)?;
            store.select_session(&id);
        }

        let mut chat = build_chat_service(&config, store)?;
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&chat);

        loop {
            let prompt = format_prompt(&chat);
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    if command == SpecialCommand::Exit {
                        break;
                    }

                    if let SpecialCommand::DeleteSession(prefix) = &command {
                        if !confirm_session_delete(&mut rl, &chat, prefix)? {
                            println!("{}\n", "Delete cancelled.".yellow());
                            continue;
                        }
                    }

                    if command != SpecialCommand::None {
                        handle_special_command(&mut chat, command);
                        continue;
                    }

                    println!("{}", "Thinking...".dimmed());
                    if let Some(reply) = chat.send(trimmed).await {
                        println!("\n{}\n", reply.text);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        chat.flush().await;
        println!("Goodbye!");
        Ok(())
    }

    /// Ask before `/delete` removes a session
    ///
    /// Unknown ids skip the question; the delete itself reports them.
    fn confirm_session_delete(
        rl: &mut DefaultEditor,
        chat: &ChatService,
        prefix: &str,
    ) -> Result<bool> {
        let Ok(id) = chat.store().resolve_id(prefix) else {
            return Ok(true);
        };
        let title = chat
            .store()
            .get_session(&id)
            .map(|s| s.title.clone())
            .unwrap_or_default();
        confirm_delete(rl, &title)
    }

    /// Apply a slash command to the running chat
    fn handle_special_command(chat: &mut ChatService, command: SpecialCommand) {
        match command {
            SpecialCommand::NewSession => {
                let id = chat.store_mut().create_session().id.clone();
                println!("Started new session {}\n", id.cyan());
            }
            SpecialCommand::ListSessions => print_sessions_table(chat.store()),
            SpecialCommand::SwitchSession(prefix) => match chat.store().resolve_id(&prefix) {
                Ok(id) => {
                    chat.store_mut().select_session(&id);
                    if let Some(session) = chat.store().current_session() {
                        print_transcript(session);
                    }
                }
                Err(e) => eprintln!("{}\n", e.to_string().red()),
            },
            SpecialCommand::DeleteSession(prefix) => match chat.store().resolve_id(&prefix) {
                Ok(id) => {
                    chat.store_mut().delete_session(&id);
                    println!("Deleted session {}\n", id.cyan());
                    if let Some(session) = chat.store().current_session() {
                        println!("Current session: {}\n", session.title.bold());
                    }
                }
                Err(e) => eprintln!("{}\n", e.to_string().red()),
            },
            SpecialCommand::Rename(title) => {
                let Some(id) = chat.store().current_session().map(|s| s.id.clone()) else {
                    eprintln!("{}\n", "No current session".red());
                    return;
                };
                chat.store_mut().update_session_title(&id, title.as_str());
                println!("Renamed session to {}\n", title.bold());
            }
            SpecialCommand::ShowHistory => print_exchange_log(&chat.history()),
            SpecialCommand::ClearHistory => {
                chat.clear_history();
                println!("Exchange log cleared\n");
            }
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit | SpecialCommand::None => {}
        }
    }

    /// Prompt showing the current session title
    fn format_prompt(chat: &ChatService) -> String {
        let title = chat
            .store()
            .current_session()
            .map(|s| s.title.as_str())
            .unwrap_or("no session");
        format!("[{}] >> ", title.cyan())
    }

    /// Display welcome banner at the start of interactive chat
    fn print_welcome_banner(chat: &ChatService) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              Chatpad Interactive Chat - Welcome!             ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Sessions: {}", chat.store().len());

        if let Some(session) = chat.store().current_session() {
            print_transcript(session);
        }

        println!("Type '/help' for available commands, '/exit' to quit\n");
    }

    fn print_exchange_log(history: &[String]) {
        if history.is_empty() {
            println!("{}\n", "Nothing exchanged yet.".yellow());
            return;
        }

        for (index, text) in history.iter().enumerate() {
            println!("{:>3}. {}", index + 1, text);
        }
        println!();
    }

}

// One-shot send handler
pub mod send {
    //! Send a single message and print the reply.

    use super::*;

    /// Send `text` into the current session (or a new one) and print the reply
    ///
    /// # Errors
    ///
    /// Returns error if the session database or HTTP client cannot be set up
    pub async fn run_send(config: Config, text: String, new_session: bool) -> Result<()> {
        let mut store = open_session_store(&config)?;
        if new_session {
            store.create_session();
        }

        let mut chat = build_chat_service(&config, store)?;
        match chat.send(&text).await {
            Some(reply) => println!("{}", reply.text),
            None => tracing::warn!("Nothing to send: message is empty"),
        }

        chat.flush().await;
        Ok(())
    }
}

pub use sessions::handle_sessions;
