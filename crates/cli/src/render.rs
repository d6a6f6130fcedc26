// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! Rendering of the progress tree between polls.
//!
//! The engine exposes plain display rows; everything about presentation —
//! format, color, indentation — is decided here from an explicit
//! [`DisplayConfig`] resolved once at startup.

use crate::color;
use clap::ValueEnum;
use std::io::Write;
use tow_core::format_elapsed;
use tow_engine::{DisplayRow, RootIndicator};

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Display settings resolved once and passed to every render call.
#[derive(Clone, Copy, Debug)]
pub struct DisplayConfig {
    pub format: OutputFormat,
    pub color: bool,
}

impl DisplayConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self { format, color: color::should_colorize() }
    }
}

/// Render one poll's snapshot of the tree.
pub fn render(
    rows: &[DisplayRow],
    indicator: &RootIndicator,
    config: &DisplayConfig,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match config.format {
        OutputFormat::Json => {
            let payload = serde_json::json!({ "indicator": indicator, "jobs": rows });
            writeln!(out, "{}", serde_json::to_string(&payload)?)?;
        }
        OutputFormat::Text => {
            writeln!(
                out,
                "{} ({})",
                color::paint(color::codes::ACTIVE, &indicator.label, config.color),
                format_elapsed(indicator.elapsed_secs)
            )?;
            for row in rows {
                let indent = "  ".repeat(row.depth + 1);
                let status = row
                    .status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                // Pad before painting so escape codes don't skew columns.
                let status_field = format!("{:<12}", status);
                writeln!(
                    out,
                    "{}{:<28}{}{:>3}%  {}",
                    indent,
                    row.name,
                    color::paint(color::status_code(row.status, row.failed), &status_field, config.color),
                    row.percent,
                    format_elapsed(row.elapsed_secs)
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
