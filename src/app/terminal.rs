use crate::core::session::QuoteSessionManager;
use crate::domain::model::{Quote, Rgb, SessionState};
use crate::utils::error::Result;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

const RESET: &str = "\x1b[0m";

pub const HELP: &str = "\
Commands:
  next          fetch another random quote
  save          save the current quote
  list          show saved quotes
  show <n>      display saved quote #n
  delete <n>    delete saved quote #n
  state         print the session state as JSON
  help          show this help
  quit          exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Save,
    List,
    Show(usize),
    Delete(usize),
    State,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("'{0}' needs the number of a saved quote")]
    MissingIndex(&'static str),

    #[error("'{0}' is not a saved quote number")]
    BadIndex(String),
}

fn parse_index(raw: Option<&str>, command: &'static str) -> std::result::Result<usize, CommandError> {
    let raw = raw.ok_or(CommandError::MissingIndex(command))?;
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(CommandError::BadIndex(raw.to_string())),
    }
}

pub fn parse_command(line: &str) -> std::result::Result<Command, CommandError> {
    let mut parts = line.split_whitespace();
    let name = parts.next().unwrap_or_default().to_ascii_lowercase();

    match name.as_str() {
        "next" | "n" => Ok(Command::Next),
        "save" | "s" => Ok(Command::Save),
        "list" | "l" => Ok(Command::List),
        "show" => parse_index(parts.next(), "show").map(Command::Show),
        "delete" | "rm" => parse_index(parts.next(), "delete").map(Command::Delete),
        "state" => Ok(Command::State),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        _ => Err(CommandError::Unknown(name)),
    }
}

fn paint(text: &str, background: Rgb, foreground: Rgb) -> String {
    format!(
        "{}{} {} {}",
        background.background_ansi(),
        foreground.foreground_ansi(),
        text,
        RESET
    )
}

/// Renders the quote card in the session's colors.
pub fn render(state: &SessionState) -> String {
    let mut lines = Vec::new();

    if state.is_loading {
        lines.push("… loading".to_string());
    }

    match &state.current_quote {
        Some(quote) => {
            lines.push(paint(&quote.text, state.background_color, state.text_color));
            lines.push(paint(
                &format!("- {}", quote.author),
                state.background_color,
                state.text_color,
            ));
        }
        None if !state.is_loading => lines.push("(no quote yet, type 'next')".to_string()),
        None => {}
    }

    if let Some(error) = &state.error {
        lines.push(format!("⚠ {}", error));
    }

    lines.join("\n")
}

pub fn render_saved(quotes: &[Quote]) -> String {
    if quotes.is_empty() {
        return "No saved quotes.".to_string();
    }

    quotes
        .iter()
        .enumerate()
        .map(|(i, quote)| format!("{:>3}. {} - {}", i + 1, quote.text, quote.author))
        .collect::<Vec<_>>()
        .join("\n")
}

// Saved quotes are numbered from 1 on screen.
fn saved_at(manager: &QuoteSessionManager, n: usize) -> Option<Quote> {
    let index = n.checked_sub(1)?;
    manager.state().saved_quotes.get(index).cloned()
}

/// Runs one command; returns text to print right away.
pub async fn execute(manager: &QuoteSessionManager, command: Command) -> Option<String> {
    match command {
        Command::Next => {
            manager.fetch_random_quote();
            None
        }
        Command::Save => match manager.save_current_quote() {
            Some(handle) => {
                handle.wait().await;
                Some("Saved.".to_string())
            }
            None => Some("Nothing to save yet.".to_string()),
        },
        Command::List => Some(render_saved(&manager.state().saved_quotes)),
        Command::Show(n) => match saved_at(manager, n) {
            Some(quote) => {
                manager.show_quote(quote);
                None
            }
            None => Some(format!("No saved quote #{}", n)),
        },
        Command::Delete(n) => match saved_at(manager, n) {
            Some(quote) => {
                manager.delete_quote(quote).wait().await;
                Some(format!("Deleted #{}.", n))
            }
            None => Some(format!("No saved quote #{}", n)),
        },
        Command::State => Some(
            serde_json::to_string_pretty(&manager.state())
                .unwrap_or_else(|e| format!("Could not serialize state: {}", e)),
        ),
        Command::Help => Some(HELP.to_string()),
        Command::Quit => None,
    }
}

fn same_card(a: &SessionState, b: &SessionState) -> bool {
    a.current_quote == b.current_quote
        && a.is_loading == b.is_loading
        && a.error == b.error
        && a.background_color == b.background_color
        && a.text_color == b.text_color
}

async fn render_changes(mut rx: watch::Receiver<SessionState>) {
    let mut last = rx.borrow_and_update().clone();
    println!("{}", render(&last));

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        if !same_card(&last, &state) {
            println!("{}", render(&state));
        }
        last = state;
    }
}

/// Reads commands from `input` until `quit` or end of input.
pub async fn run<R>(manager: &QuoteSessionManager, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("{}", HELP);
    let renderer = tokio::spawn(render_changes(manager.subscribe()));

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                tracing::debug!(?command, "Running command");
                if let Some(output) = execute(manager, command).await {
                    println!("{}", output);
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    renderer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("next"), Ok(Command::Next));
        assert_eq!(parse_command("  SAVE "), Ok(Command::Save));
        assert_eq!(parse_command("show 2"), Ok(Command::Show(2)));
        assert_eq!(parse_command("rm 1"), Ok(Command::Delete(1)));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            parse_command("show"),
            Err(CommandError::MissingIndex("show"))
        );
        assert_eq!(
            parse_command("delete 0"),
            Err(CommandError::BadIndex("0".to_string()))
        );
        assert_eq!(
            parse_command("delete x"),
            Err(CommandError::BadIndex("x".to_string()))
        );
        assert_eq!(
            parse_command("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }

    #[test]
    fn test_render_uses_session_colors() {
        let state = SessionState {
            current_quote: Some(Quote::new("Stay hungry.", "Jobs", "inspirational")),
            background_color: Rgb::new(1.0, 0.0, 0.0),
            text_color: Rgb::WHITE,
            ..SessionState::default()
        };

        let out = render(&state);

        assert!(out.contains("\x1b[48;2;255;0;0m"));
        assert!(out.contains("\x1b[38;2;255;255;255m"));
        assert!(out.contains("Stay hungry."));
        assert!(out.contains("- Jobs"));
    }

    #[test]
    fn test_render_shows_loading_and_error() {
        let state = SessionState {
            is_loading: true,
            error: Some("timeout".to_string()),
            ..SessionState::default()
        };

        let out = render(&state);

        assert!(out.contains("loading"));
        assert!(out.contains("timeout"));
        assert!(!out.contains("no quote yet"));
    }

    #[test]
    fn test_render_saved_numbers_from_one() {
        let quotes = vec![Quote::new("a", "A", "C"), Quote::new("b", "B", "C")];
        let out = render_saved(&quotes);

        assert!(out.starts_with("  1. a - A"));
        assert!(out.contains("  2. b - B"));
        assert_eq!(render_saved(&[]), "No saved quotes.");
    }
}
