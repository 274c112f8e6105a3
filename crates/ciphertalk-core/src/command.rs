//! Command grammar for user input lines.
//!
//! Each variant has its own grammar. A line that matches a command exactly
//! (after trimming) is that command; any other non-empty line is chat text.
//!
//! | Variant | Line | Command |
//! |---------|------|---------|
//! | confidentiality | `!secret <user>` | [`Command::Secret`] |
//! | both | `!exit` | [`Command::Exit`] |
//! | integrity | `!impersonate <user>` | [`Command::Impersonate`] |

use once_cell::sync::Lazy;
use regex::Regex;

use crate::protocol::Variant;

static SECRET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^!secret\s+(\w+)$").unwrap());
static IMPERSONATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!impersonate\s+(\w+)$").unwrap());
static EXIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^!exit$").unwrap());

/// Parsed user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start sealing messages to a user.
    Secret(String),
    /// Leave the current mode.
    Exit,
    /// Send as another registered user.
    Impersonate(String),
    /// Anything else: message content, as typed.
    Chat(String),
}

/// Parse one input line under `variant`'s grammar.
///
/// Returns `None` for empty or whitespace-only lines.
pub fn parse(line: &str, variant: Variant) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if EXIT_RE.is_match(trimmed) {
        return Some(Command::Exit);
    }

    let named = match variant {
        Variant::Confidentiality => &SECRET_RE,
        Variant::Integrity => &IMPERSONATE_RE,
    };
    if let Some(caps) = named.captures(trimmed) {
        let user = caps[1].to_string();
        return Some(match variant {
            Variant::Confidentiality => Command::Secret(user),
            Variant::Integrity => Command::Impersonate(user),
        });
    }

    Some(Command::Chat(line.to_string()))
}
