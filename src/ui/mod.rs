//! Styled terminal output helpers.
//!
//! Thin wrappers over `colored` so every command prints headings, labels
//! and values the same way. `colored` already honors `NO_COLOR` and
//! non-tty output, so these stay plain string transforms.

use colored::Colorize;

/// Section heading, e.g. "Install packages".
pub fn heading(text: &str) -> String {
    text.cyan().bold().to_string()
}

pub fn success(text: &str) -> String {
    text.green().to_string()
}

pub fn warning(text: &str) -> String {
    text.yellow().to_string()
}

pub fn error(text: &str) -> String {
    text.red().bold().to_string()
}

pub fn info(text: &str) -> String {
    text.blue().to_string()
}

/// De-emphasized text for skipped or secondary lines.
pub fn muted(text: &str) -> String {
    text.bright_black().to_string()
}

/// Label style for `Key: value` pairs.
pub fn key(text: &str) -> String {
    text.cyan().bold().to_string()
}

/// Value style for `Key: value` pairs.
pub fn value(text: &str) -> String {
    text.bold().to_string()
}
