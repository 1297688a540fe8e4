// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal colors for help and status output.
//!
//! `NO_COLOR=1` disables colors, `COLOR=1` forces them without a TTY.

use std::io::IsTerminal;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers.
    pub const HEADER: u8 = 74;
    /// Commands and literals.
    pub const LITERAL: u8 = 250;
    /// Hints and secondary detail.
    pub const CONTEXT: u8 = 245;
    /// Items that need attention.
    pub const ALERT: u8 = 174;
}

pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn paint(code: u8, text: &str) -> String {
    styled(should_colorize(), code, text)
}

fn styled(enabled: bool, code: u8, text: &str) -> String {
    if enabled {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

pub fn alert(text: &str) -> String {
    paint(codes::ALERT, text)
}

/// Colorizes an examples block for `after_help`.
///
/// Lines ending in `:` become headers. In `  gsq args   Description` lines
/// the command is shown as a literal and the description is left alone.
pub fn examples(text: &str) -> String {
    render_examples(text, should_colorize())
}

fn render_examples(text: &str, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            if trimmed.ends_with(':') && !trimmed.contains("  ") {
                return format!("{indent}{}", styled(true, codes::HEADER, trimmed));
            }
            match trimmed.find("   ") {
                Some(end) => format!(
                    "{indent}{}{}",
                    styled(true, codes::LITERAL, &trimmed[..end]),
                    &trimmed[end..]
                ),
                None => format!("{indent}{}", styled(true, codes::LITERAL, trimmed)),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
