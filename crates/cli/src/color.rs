// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

use clap::builder::styling::{Ansi256Color, Color, Style, Styles};
use std::io::IsTerminal;
use tow_core::JobStatus;

pub mod codes {
    /// Headers and running jobs: pastel cyan / steel blue
    pub const ACTIVE: u8 = 74;
    /// Successful terminal states: soft green
    pub const OK: u8 = 71;
    /// Failed, errored, and canceled jobs: soft red
    pub const FAILED: u8 = 167;
    /// Pre-run states and secondary text: medium grey
    pub const MUTED: u8 = 245;
}

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Build clap `Styles` using the project palette.
pub fn styles() -> Styles {
    if !should_colorize() {
        return Styles::plain();
    }
    Styles::styled()
        .header(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::ACTIVE)))))
        .literal(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::OK)))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(codes::MUTED)))))
}

const RESET: &str = "\x1b[0m";

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

/// Wrap text in a 256-color escape when color is enabled.
pub fn paint(code: u8, text: &str, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", fg256(code), text, RESET)
    } else {
        text.to_string()
    }
}

/// Palette code for a job's displayed status.
pub fn status_code(status: Option<JobStatus>, failed: bool) -> u8 {
    match status {
        Some(status) if failed || matches!(status, JobStatus::Failed | JobStatus::Error | JobStatus::Canceled) => {
            codes::FAILED
        }
        Some(JobStatus::Successful) => codes::OK,
        Some(JobStatus::Running) => codes::ACTIVE,
        _ => codes::MUTED,
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
