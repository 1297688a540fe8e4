// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::colors;
use anstyle::{Ansi256Color, Color, Style};
use clap::builder::styling::Styles;

fn fg(code: u8) -> Style {
    Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))))
}

/// clap help styles matching the rest of the output.
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(fg(colors::codes::HEADER))
        .usage(fg(colors::codes::HEADER))
        .literal(fg(colors::codes::LITERAL))
        .placeholder(fg(colors::codes::CONTEXT))
        .valid(fg(colors::codes::CONTEXT))
        .invalid(fg(colors::codes::ALERT))
        .error(fg(colors::codes::ALERT))
}
