//! Session listing and management output
//!
//! Renders the session table and transcripts, and handles the
//! `chatpad sessions` subcommands.

use crate::cli::SessionCommand;
use crate::config::Config;
use crate::error::{ChatpadError, Result};
use crate::session::{ChatSession, SessionStore};
use colored::Colorize;
use prettytable::{format, Table};
use rustyline::DefaultEditor;

/// Shortest id prefix shown in tables
const MIN_SHORT_ID: usize = 8;

/// Longest title shown in tables before it is cut
const MAX_TABLE_TITLE: usize = 40;

/// Question asked before a session is deleted
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this chat?";

/// Handle `chatpad sessions ...`
pub async fn handle_sessions(config: &Config, command: SessionCommand) -> Result<()> {
    let mut store = super::open_session_store(config)?;

    match command {
        SessionCommand::List => print_sessions_table(&store),
        SessionCommand::Show { id } => {
            let id = store.resolve_id(&id)?;
            let session = store
                .get_session(&id)
                .ok_or_else(|| ChatpadError::SessionNotFound(id.clone()))?;
            print_transcript(session);
        }
        SessionCommand::New => {
            let id = store.create_session().id.clone();
            println!("{}", format!("Created session {}", id).green());
        }
        SessionCommand::Delete { id, yes } => {
            let id = store.resolve_id(&id)?;
            let title = store
                .get_session(&id)
                .map(|s| s.title.clone())
                .unwrap_or_default();

            if yes || confirm_delete(&mut DefaultEditor::new()?, &title)? {
                store.delete_session(&id);
                println!("{}", format!("Deleted session {}", id).green());
            } else {
                println!("{}", "Delete cancelled.".yellow());
            }
        }
        SessionCommand::Rename { id, title } => {
            let id = store.resolve_id(&id)?;
            store.update_session_title(&id, title.trim());
            println!("{}", format!("Renamed session {}", id).green());
        }
    }

    store.flush().await;
    Ok(())
}

/// Print the session table, newest first, marking the current session
pub fn print_sessions_table(store: &SessionStore) {
    let summaries = store.summaries();
    if summaries.is_empty() {
        println!("{}", "No chat sessions found.".yellow());
        return;
    }

    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    let short_len = short_id_len(&ids);

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "",
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for summary in &summaries {
        let marker = if summary.is_current { "*" } else { "" };
        let id_short = short_id(&summary.id, short_len);
        let updated = summary
            .updated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();

        table.add_row(prettytable::row![
            marker.green(),
            id_short.cyan(),
            clip_title(&summary.title, MAX_TABLE_TITLE),
            summary.message_count,
            updated
        ]);
    }

    println!("\nChat Sessions:");
    table.printstd();
    println!();
    println!(
        "Use {} to resume a session.",
        "chatpad chat --session <ID>".cyan()
    );
    println!();
}

/// Print every message of a session with its local time
pub fn print_transcript(session: &ChatSession) {
    println!("\n{} ({})", session.title.bold(), session.id.dimmed());
    println!(
        "Created {}\n",
        session
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
    );

    for message in &session.messages {
        let time = message
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M");
        let speaker = if message.is_user {
            "You".cyan().bold()
        } else {
            "AI".green().bold()
        };
        println!("[{}] {}: {}", time.to_string().dimmed(), speaker, message.text);
    }
    println!();
}

/// Ask the user to confirm deleting the session titled `title`
///
/// Only an explicit `y` or `yes` confirms; Ctrl-C and Ctrl-D cancel.
///
/// # Errors
///
/// Returns error if the terminal cannot be read
pub fn confirm_delete(editor: &mut DefaultEditor, title: &str) -> Result<bool> {
    use rustyline::error::ReadlineError;

    println!("{} ({})", DELETE_PROMPT, title.bold());
    match editor.readline("Delete? [y/N] ") {
        Ok(answer) => Ok(is_affirmative(&answer)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Whether a confirmation answer means yes
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// The first `len` characters of `id`
fn short_id(id: &str, len: usize) -> &str {
    id.char_indices().nth(len).map_or(id, |(i, _)| &id[..i])
}

/// Length in characters of the shortest prefix (at least eight) that
/// tells every id apart
///
/// ULIDs created close together share their leading timestamp characters,
/// so a fixed prefix length is not enough.
fn short_id_len(ids: &[&str]) -> usize {
    let longest = ids.iter().map(|id| id.chars().count()).max().unwrap_or(0);
    let mut len = MIN_SHORT_ID.min(longest);

    while len < longest {
        let mut prefixes: Vec<&str> = ids.iter().map(|id| short_id(id, len)).collect();
        prefixes.sort_unstable();
        let total = prefixes.len();
        prefixes.dedup();
        if prefixes.len() == total {
            break;
        }
        len += 1;
    }

    len
}

fn clip_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() > max_chars {
        let head: String = title.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SESSIONS_KEY};
    use std::sync::Arc;

    #[test]
    fn test_short_id_len_defaults_to_eight() {
        let ids = ["01HZXAAAAAAAAAAAAAAAAAAAAA", "01JQQBBBBBBBBBBBBBBBBBBBBB"];
        assert_eq!(short_id_len(&ids), 8);
    }

    #[test]
    fn test_short_id_len_grows_until_unique() {
        let ids = ["01HZXAAAAAAAQ1AAAAAAAAAAAA", "01HZXAAAAAAAQ2BBBBBBBBBBBB"];
        assert_eq!(short_id_len(&ids), 14);
    }

    #[test]
    fn test_short_id_len_handles_empty_and_short_ids() {
        assert_eq!(short_id_len(&[]), 0);
        assert_eq!(short_id_len(&["abc"]), 3);
    }

    #[test]
    fn test_short_id_cuts_on_character_boundaries() {
        let ids = ["aéééé", "aééééx"];
        assert_eq!(short_id_len(&ids), 6);
        assert_eq!(short_id("aééééx", 3), "aéé");
        assert_eq!(short_id("aéééé", 8), "aéééé");
    }

    #[test]
    fn test_sessions_table_with_non_ascii_ids() {
        let sessions: Vec<ChatSession> = ["aéééé", "aééééx"]
            .iter()
            .map(|id| ChatSession {
                id: id.to_string(),
                ..ChatSession::new()
            })
            .collect();
        let blob = serde_json::to_string(&sessions).unwrap();
        let storage = Arc::new(MemoryStore::with_value(SESSIONS_KEY, &blob));

        let store = SessionStore::load(storage, SESSIONS_KEY);
        assert_eq!(store.len(), 2);

        print_sessions_table(&store);
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative(" YES \n"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[test]
    fn test_clip_title_counts_characters() {
        assert_eq!(clip_title("short", 40), "short");
        assert_eq!(clip_title("ééééé", 4), "é...");
    }
}
