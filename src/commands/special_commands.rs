//! Special commands parser for interactive chat mode
//!
//! This module parses the slash commands that can be entered during an
//! interactive chat. Special commands allow users to:
//! - Start, list, switch, rename, and delete chat sessions
//! - Inspect or clear the exchange log of the running session
//! - Display help information
//! - Exit the chat
//!
//! Commands are prefixed with `/`. Command names are case-insensitive;
//! arguments keep their case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Command takes no argument but one was provided
    #[error("Command {command} does not take an argument: {arg}")]
    UnexpectedArgument { command: String, arg: String },
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the session store or the chat itself rather
/// than being sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new session and make it current
    NewSession,

    /// Show the session table
    ListSessions,

    /// Make another session current (id or unique prefix)
    SwitchSession(String),

    /// Delete a session (id or unique prefix)
    DeleteSession(String),

    /// Rename the current session
    Rename(String),

    /// Show the text exchanged with the model in this run
    ShowHistory,

    /// Forget the exchange log
    ClearHistory,

    /// Display help information
    Help,

    /// Exit the interactive chat
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the model as a chat message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` if input starts with "/" but is
/// not a known command, `CommandError::MissingArgument` when a required
/// argument is absent, and `CommandError::UnexpectedArgument` when an
/// argument is given to a command that takes none.
///
/// # Examples
///
/// ```
/// use chatpad::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/switch 01HZX").unwrap();
/// assert_eq!(cmd, SpecialCommand::SwitchSession("01HZX".to_string()));
///
/// let cmd = parse_special_command("hello there").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" => no_argument("/new", arg, SpecialCommand::NewSession),
        "/sessions" | "/ls" => no_argument("/sessions", arg, SpecialCommand::ListSessions),
        "/switch" => required_argument("/switch", "/switch <id>", arg)
            .map(SpecialCommand::SwitchSession),
        "/delete" => required_argument("/delete", "/delete <id>", arg)
            .map(SpecialCommand::DeleteSession),
        "/title" => required_argument("/title", "/title <text>", arg).map(SpecialCommand::Rename),
        "/history" => no_argument("/history", arg, SpecialCommand::ShowHistory),
        "/clear" => no_argument("/clear", arg, SpecialCommand::ClearHistory),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" | "/q" => Ok(SpecialCommand::Exit),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn no_argument(
    command: &str,
    arg: &str,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    if arg.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnexpectedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        })
    }
}

fn required_argument(command: &str, usage: &str, arg: &str) -> Result<String, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(arg.to_string())
    }
}

/// Print help for the special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

SESSIONS:
  /new            - Start a new chat session
  /sessions       - List sessions (newest first)
  /ls             - Same as /sessions
  /switch <id>    - Switch to a session (full id or unique prefix)
  /delete <id>    - Delete a session
  /title <text>   - Rename the current session

EXCHANGE LOG:
  /history        - Show text exchanged with the model in this run
  /clear          - Forget the exchange log

SESSION CONTROL:
  /help           - Show this help message
  /?              - Same as /help
  /exit           - Exit the chat
  /quit, /q, exit - Same as /exit

NOTES:
  - Command names are case-insensitive
  - Regular text (not starting with /) is sent to the model
  - Every message is saved to the current session
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_not_a_command() {
        assert_eq!(
            parse_special_command("What is Rust?").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("exiting soon").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(
            parse_special_command("/new").unwrap(),
            SpecialCommand::NewSession
        );
        assert_eq!(
            parse_special_command("/sessions").unwrap(),
            SpecialCommand::ListSessions
        );
        assert_eq!(
            parse_special_command("/ls").unwrap(),
            SpecialCommand::ListSessions
        );
    }

    #[test]
    fn test_parse_switch_keeps_argument_case() {
        assert_eq!(
            parse_special_command("/SWITCH 01HZXAbc").unwrap(),
            SpecialCommand::SwitchSession("01HZXAbc".to_string())
        );
    }

    #[test]
    fn test_parse_delete() {
        assert_eq!(
            parse_special_command("/delete 01HZ").unwrap(),
            SpecialCommand::DeleteSession("01HZ".to_string())
        );
    }

    #[test]
    fn test_parse_title_keeps_inner_whitespace() {
        assert_eq!(
            parse_special_command("/title   Trip  planning ").unwrap(),
            SpecialCommand::Rename("Trip  planning".to_string())
        );
    }

    #[test]
    fn test_parse_missing_argument() {
        let err = parse_special_command("/switch").unwrap_err();
        assert_eq!(
            err,
            CommandError::MissingArgument {
                command: "/switch".to_string(),
                usage: "/switch <id>".to_string(),
            }
        );
        assert!(err.to_string().contains("Usage: /switch <id>"));

        assert!(matches!(
            parse_special_command("/title   "),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_unexpected_argument() {
        assert_eq!(
            parse_special_command("/new chat").unwrap_err(),
            CommandError::UnexpectedArgument {
                command: "/new".to_string(),
                arg: "chat".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_history_commands() {
        assert_eq!(
            parse_special_command("/history").unwrap(),
            SpecialCommand::ShowHistory
        );
        assert_eq!(
            parse_special_command("/clear").unwrap(),
            SpecialCommand::ClearHistory
        );
    }

    #[test]
    fn test_parse_help_aliases() {
        assert_eq!(parse_special_command("/help").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
    }

    #[test]
    fn test_parse_exit_aliases() {
        for input in ["/exit", "/quit", "/q", "exit", "QUIT", "  /Exit  "] {
            assert_eq!(
                parse_special_command(input).unwrap(),
                SpecialCommand::Exit,
                "input: {}",
                input
            );
        }
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = parse_special_command("/mode write").unwrap_err();
        assert_eq!(err, CommandError::UnknownCommand("/mode write".to_string()));
        assert!(err.to_string().contains("/help"));
    }
}
