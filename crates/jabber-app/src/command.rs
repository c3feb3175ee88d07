//! Input line parsing.
//!
//! A line starting with `/` is a command; anything else is plain text whose
//! meaning depends on the session phase (see [`crate::App`]).

use thiserror::Error;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/connect <name>`
    Connect(String),
    /// `/disconnect`
    Disconnect,
    /// `/quit`
    Quit,
    /// Plain text, untrimmed.
    Text(String),
}

/// Why a command line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Not a known command.
    #[error("unknown command: /{0}")]
    Unknown(String),

    /// Known command with bad arguments.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse an input line.
///
/// Returns `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Some(Command::Text(line.to_string())));
    };

    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let args = args.trim();

    let command = match name {
        "connect" | "c" => {
            if args.is_empty() || args.contains(char::is_whitespace) {
                return Err(CommandError::Usage("/connect <name>"));
            }
            Command::Connect(args.to_string())
        },
        "disconnect" | "d" => {
            if !args.is_empty() {
                return Err(CommandError::Usage("/disconnect"));
            }
            Command::Disconnect
        },
        "quit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}
