//! Console command parsing
//!
//! Session verbs are delegated to [`services_session::commands`]; the rest
//! drive the editing surface or the tab strip by display position.

use crate::ConsoleError;
use services_session::commands::{parse_command, SessionCommand};

/// One line of console input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Session(SessionCommand),
    /// Print the active document
    Show,
    /// Append text to the active document
    Append(String),
    /// Replace the active document
    Set(String),
    /// Click the body of the n-th tab (1-based)
    Click(usize),
    /// Double-click the n-th tab
    DoubleClick(usize),
    /// Click the close glyph of the n-th tab
    CloseClick(usize),
    /// Replace the text of the open rename input
    Type(String),
    /// Move focus out of the rename input
    Blur,
    Warnings,
    Help,
    Quit,
}

/// Parses a console line
///
/// Text arguments are taken verbatim after the verb; `\n` stands for a
/// line break.
pub fn parse_console_command(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let line = line.trim_start();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (line.trim_end(), ""),
    };

    match verb {
        "show" => Ok(ConsoleCommand::Show),
        "append" => Ok(ConsoleCommand::Append(unescape(rest))),
        "set" => Ok(ConsoleCommand::Set(unescape(rest))),
        "type" => Ok(ConsoleCommand::Type(rest.to_string())),
        "click" => parse_position(rest, "click").map(ConsoleCommand::Click),
        "dblclick" => parse_position(rest, "dblclick").map(ConsoleCommand::DoubleClick),
        "xclick" => parse_position(rest, "xclick").map(ConsoleCommand::CloseClick),
        "blur" => Ok(ConsoleCommand::Blur),
        "warnings" => Ok(ConsoleCommand::Warnings),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        _ => Ok(ConsoleCommand::Session(parse_command(line)?)),
    }
}

fn parse_position(raw: &str, verb: &str) -> Result<usize, ConsoleError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConsoleError::Usage(format!("{} <tab number>", verb))),
    }
}

fn unescape(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

/// Help text
pub const HELP: &str = "\
Commands:
  new                    open new.lua, new1.lua, ...
  open <name>            open or restore a named tab
  switch <name>          activate a tab
  rename <old> <new>     rename a tab (quote names with spaces)
  close <name>           close a tab
  list                   list tabs
  show                   print the active document
  append <text>          append to the active document (\\n for newline)
  set <text>             replace the active document
  click <n>              click tab n
  dblclick <n>           start renaming tab n
  type <text>            text for the rename input
  blur                   leave the rename input
  xclick <n>             click the close glyph of tab n
  warnings               show storage warnings
  quit                   exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_commands_keep_spacing() {
        assert_eq!(
            parse_console_command("append   local x = 1").unwrap(),
            ConsoleCommand::Append("  local x = 1".to_string())
        );
        assert_eq!(
            parse_console_command("set a\\nb").unwrap(),
            ConsoleCommand::Set("a\nb".to_string())
        );
        assert_eq!(
            parse_console_command("type my file.lua").unwrap(),
            ConsoleCommand::Type("my file.lua".to_string())
        );
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(parse_console_command("click 2").unwrap(), ConsoleCommand::Click(2));
        assert_eq!(
            parse_console_command("xclick 1").unwrap(),
            ConsoleCommand::CloseClick(1)
        );
        assert!(parse_console_command("click 0").is_err());
        assert!(parse_console_command("dblclick x").is_err());
    }

    #[test]
    fn test_parse_delegates_session_verbs() {
        assert_eq!(
            parse_console_command("switch main.lua").unwrap(),
            ConsoleCommand::Session(SessionCommand::Switch {
                name: "main.lua".to_string()
            })
        );
        assert!(matches!(
            parse_console_command("bogus"),
            Err(ConsoleError::Session(_))
        ));
    }

    #[test]
    fn test_parse_bare_verbs() {
        assert_eq!(parse_console_command("quit").unwrap(), ConsoleCommand::Quit);
        assert_eq!(parse_console_command("blur\n").unwrap(), ConsoleCommand::Blur);
        assert_eq!(parse_console_command("show").unwrap(), ConsoleCommand::Show);
    }
}
