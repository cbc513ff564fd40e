//! Command interface for the session
//!
//! A minimal text surface over the controller operations. It is not a
//! shell; hosts use it to drive tabs from a line of input.

use crate::{RenameOutcome, RenameRejection, SessionController, SessionError, TabSummary};
use core_types::TabId;
use editor_core::EditingSurface;

/// Session command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Open a fresh `new*.lua` buffer
    New,
    /// Open (or restore) a named buffer
    Open { name: String },
    /// Switch to a buffer
    Switch { name: String },
    /// Rename a buffer
    Rename { from: String, to: String },
    /// Close a buffer
    Close { name: String },
    /// List all buffers
    List,
    /// Report the active buffer
    Current,
}

/// Result of executing a session command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Opened { tab_id: TabId, name: String },
    Switched { name: String },
    Renamed { from: String, to: String },
    RenameReverted { reason: RenameRejection },
    Closed { name: String },
    List { tabs: Vec<TabSummary> },
    Current { name: Option<String> },
    /// Command ignored (unknown tab)
    Ignored { message: String },
    Error { message: String },
}

impl<S: EditingSurface> SessionController<S> {
    /// Executes a session command
    pub fn execute_command(&mut self, command: SessionCommand) -> CommandResult {
        match command {
            SessionCommand::New => self.cmd_open(None),
            SessionCommand::Open { name } => self.cmd_open(Some(name)),
            SessionCommand::Switch { name } => {
                if self.switch_to(&name) {
                    CommandResult::Switched { name }
                } else {
                    CommandResult::Ignored {
                        message: format!("No tab named {}", name),
                    }
                }
            }
            SessionCommand::Rename { from, to } => match self.rename(&from, &to) {
                RenameOutcome::Renamed { from, to, .. } => CommandResult::Renamed {
                    from: from.into_string(),
                    to: to.into_string(),
                },
                RenameOutcome::Reverted(reason) => CommandResult::RenameReverted { reason },
            },
            SessionCommand::Close { name } => {
                if self.close(&name) {
                    CommandResult::Closed { name }
                } else {
                    CommandResult::Ignored {
                        message: format!("No tab named {}", name),
                    }
                }
            }
            SessionCommand::List => CommandResult::List { tabs: self.tabs() },
            SessionCommand::Current => CommandResult::Current {
                name: self.current().map(|n| n.to_string()),
            },
        }
    }

    fn cmd_open(&mut self, name: Option<String>) -> CommandResult {
        let result = match &name {
            Some(name) => self.open_or_restore(name, ""),
            None => self.new_tab(),
        };
        match result {
            Ok(tab_id) => CommandResult::Opened {
                tab_id,
                name: self
                    .name_of(tab_id)
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
            },
            Err(err) => CommandResult::Error {
                message: err.to_string(),
            },
        }
    }
}

/// Splits a line into words; double quotes group words containing spaces
pub fn tokenize(input: &str) -> Result<Vec<String>, SessionError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(SessionError::InvalidCommand(
            "Unterminated quote".to_string(),
        ));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Parses a command string
pub fn parse_command(input: &str) -> Result<SessionCommand, SessionError> {
    let parts = tokenize(input)?;
    let Some(verb) = parts.first() else {
        return Err(SessionError::InvalidCommand("Empty command".to_string()));
    };

    match verb.as_str() {
        "new" => Ok(SessionCommand::New),
        "open" => single_arg(&parts, "open <name>").map(|name| SessionCommand::Open { name }),
        "switch" => {
            single_arg(&parts, "switch <name>").map(|name| SessionCommand::Switch { name })
        }
        "close" => single_arg(&parts, "close <name>").map(|name| SessionCommand::Close { name }),
        "rename" => match parts.as_slice() {
            [_, from, to] => Ok(SessionCommand::Rename {
                from: from.clone(),
                to: to.clone(),
            }),
            _ => Err(SessionError::InvalidCommand(
                "Usage: rename <old> <new>".to_string(),
            )),
        },
        "list" | "ls" => Ok(SessionCommand::List),
        "current" => Ok(SessionCommand::Current),
        unknown => Err(SessionError::InvalidCommand(format!(
            "Unknown command: {}",
            unknown
        ))),
    }
}

fn single_arg(parts: &[String], usage: &str) -> Result<String, SessionError> {
    match parts {
        [_, arg] => Ok(arg.clone()),
        _ => Err(SessionError::InvalidCommand(format!("Usage: {}", usage))),
    }
}
