//! # Tab Shell Console
//!
//! A line-driven host for the session: it owns the controller, the tab
//! strip and an optional journal file that stands in for the browser's
//! local storage. Every command is followed by a save, so rerunning the
//! console with the same `--store` behaves like a page reload.

pub mod bootstrap;
pub mod commands;

pub use bootstrap::{load_journal, load_session_config, save_journal, ConsoleConfig};
pub use commands::{parse_console_command, ConsoleCommand, HELP};

use core_types::TabId;
use editor_core::HeadlessSurface;
use services_session::commands::CommandResult;
use services_session::{SessionController, SessionError};
use services_settings::SettingsError;
use services_storage::{JournaledStore, PersistentStore, StoreError};
use services_tab_strip::{ClickTarget, Gesture, GestureOutcome, TabStripView};
use std::cell::RefCell;
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// Console errors
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("Usage: {0}")]
    Usage(String),
}

/// What the console printed for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Interactive console state
pub struct Console {
    session: SessionController<HeadlessSurface>,
    strip: TabStripView,
    journal: Rc<RefCell<JournaledStore>>,
    store_path: Option<PathBuf>,
}

impl Console {
    /// Loads settings and storage, then restores the session
    pub fn start(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let session_config = bootstrap::load_session_config(config.config_path.as_deref())?;
        let journal = match &config.store_path {
            Some(path) => bootstrap::load_journal(path)?,
            None => JournaledStore::new(),
        };
        let journal = Rc::new(RefCell::new(journal));

        let session = SessionController::restore(
            PersistentStore::new(Rc::clone(&journal)),
            HeadlessSurface::new(),
            session_config,
        )?;
        let strip = TabStripView::from_session(&session);

        let console = Self {
            session,
            strip,
            journal,
            store_path: config.store_path.clone(),
        };
        console.save()?;
        Ok(console)
    }

    pub fn session(&self) -> &SessionController<HeadlessSurface> {
        &self.session
    }

    pub fn strip(&self) -> &TabStripView {
        &self.strip
    }

    /// Runs one input line and saves
    pub fn execute(&mut self, line: &str) -> Result<Reply, ConsoleError> {
        let command = parse_console_command(line)?;
        debug!(?command, "console command");
        let reply = self.dispatch(command)?;
        self.save()?;
        Ok(reply)
    }

    fn dispatch(&mut self, command: ConsoleCommand) -> Result<Reply, ConsoleError> {
        let output = match command {
            ConsoleCommand::Quit => return Ok(Reply::Quit),
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Session(command) => {
                let result = self.session.execute_command(command);
                self.strip.sync(&self.session);
                format_result(&result)
            }
            ConsoleCommand::Show => self.session.surface().render(),
            ConsoleCommand::Append(text) => match self.session.active_document() {
                Some(document) => {
                    document.append(&text);
                    String::new()
                }
                None => "no active tab".to_string(),
            },
            ConsoleCommand::Set(text) => match self.session.active_document() {
                Some(document) => {
                    document.set_value(text);
                    String::new()
                }
                None => "no active tab".to_string(),
            },
            ConsoleCommand::Click(n) => self.gesture_at(n, |tab| Gesture::Click {
                tab,
                target: ClickTarget::Body,
            })?,
            ConsoleCommand::DoubleClick(n) => self.gesture_at(n, Gesture::DoubleClick)?,
            ConsoleCommand::CloseClick(n) => self.gesture_at(n, |tab| Gesture::Click {
                tab,
                target: ClickTarget::CloseGlyph,
            })?,
            ConsoleCommand::Type(text) => match self.strip.editing_tab() {
                Some(tab) => {
                    let outcome = self
                        .strip
                        .handle(&mut self.session, Gesture::Input { tab, text })?;
                    format_outcome(&outcome)
                }
                None => "no tab is being renamed".to_string(),
            },
            ConsoleCommand::Blur => match self.strip.editing_tab() {
                Some(tab) => {
                    let outcome = self.strip.handle(&mut self.session, Gesture::Blur(tab))?;
                    format_outcome(&outcome)
                }
                None => String::new(),
            },
            ConsoleCommand::Warnings => {
                let warnings = self.session.warnings();
                if warnings.is_empty() {
                    "no storage warnings".to_string()
                } else {
                    warnings
                        .iter()
                        .map(|w| format!("warning: {}", w))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
        };

        let mut output = output;
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&self.strip.render());
        Ok(Reply::Output(output))
    }

    fn gesture_at(
        &mut self,
        position: usize,
        gesture: impl FnOnce(TabId) -> Gesture,
    ) -> Result<String, ConsoleError> {
        let Some(tab) = self.strip.at(position - 1).map(|e| e.id) else {
            return Ok(format!("no tab at position {}", position));
        };
        let outcome = self.strip.handle(&mut self.session, gesture(tab))?;
        Ok(format_outcome(&outcome))
    }

    /// Writes the journal to the store file, if there is one
    pub fn save(&self) -> Result<(), ConsoleError> {
        let Some(path) = &self.store_path else {
            return Ok(());
        };
        let mut journal = self.journal.borrow_mut();
        journal.compact();
        bootstrap::save_journal(&journal, path)
    }
}

/// Reads commands from `input` until `quit` or end of input
pub fn run<R: BufRead, W: Write>(
    console: &mut Console,
    input: R,
    mut output: W,
) -> Result<(), ConsoleError> {
    writeln!(output, "{}", console.strip().render())?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match console.execute(&line) {
            Ok(Reply::Quit) => break,
            Ok(Reply::Output(text)) => writeln!(output, "{}", text)?,
            Err(err @ (ConsoleError::Usage(_) | ConsoleError::Session(_))) => {
                writeln!(output, "error: {}", err)?
            }
            Err(err) => {
                warn!(%err, "command failed");
                return Err(err);
            }
        }
    }
    Ok(())
}

fn format_result(result: &CommandResult) -> String {
    match result {
        CommandResult::Opened { name, .. } => format!("opened {}", name),
        CommandResult::Switched { name } => format!("switched to {}", name),
        CommandResult::Renamed { from, to } => format!("renamed {} -> {}", from, to),
        CommandResult::RenameReverted { reason } => format!("rename ignored: {}", reason),
        CommandResult::Closed { name } => format!("closed {}", name),
        CommandResult::List { tabs } => {
            let mut out = String::new();
            for (i, tab) in tabs.iter().enumerate() {
                let marker = if tab.active { "*" } else { " " };
                let _ = writeln!(out, "{:>2}{} {}", i + 1, marker, tab.name);
            }
            out.trim_end().to_string()
        }
        CommandResult::Current { name } => match name {
            Some(name) => name.clone(),
            None => "(no active tab)".to_string(),
        },
        CommandResult::Ignored { message } => message.clone(),
        CommandResult::Error { message } => format!("error: {}", message),
    }
}

fn format_outcome(outcome: &GestureOutcome) -> String {
    match outcome {
        GestureOutcome::RenameReverted { reason, .. } => format!("rename ignored: {}", reason),
        _ => String::new(),
    }
}
