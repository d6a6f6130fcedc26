// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

//! The `tow watch` poll loop.
//!
//! The engine is caller-driven: this loop is the only thing that mutates
//! the tree. Each iteration refreshes every tracked job with one batched
//! call, optionally streams new log output, renders the tree, and reaps
//! completed jobs. The loop ends when the tree drains or on Ctrl-C.

use crate::exit_error::ExitError;
use crate::render::{self, DisplayConfig, OutputFormat};
use clap::Args;
use std::io::Write;
use std::time::Duration;
use tow_adapters::{ControllerClient, ControllerConfig};
use tow_core::{format_elapsed, JobId, JobKind, SystemClock};
use tow_engine::{ProgressNode, ProgressTree};

#[derive(Args)]
pub struct WatchArgs {
    /// Job ids to watch
    #[arg(required = true)]
    ids: Vec<u64>,

    /// Resource kind of the given ids
    #[arg(long, default_value = "job")]
    kind: JobKind,

    /// Controller base URL
    #[arg(long, env = "TOWLINE_HOST")]
    host: String,

    /// Controller API token
    #[arg(long, env = "TOWLINE_TOKEN", hide_env_values = true)]
    token: String,

    /// Seconds between polls
    #[arg(long, default_value_t = 5)]
    interval: u64,

    /// Stream captured stdout while jobs run
    #[arg(long)]
    logs: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

pub async fn run(args: WatchArgs) -> anyhow::Result<()> {
    let client = ControllerClient::new(ControllerConfig::new(&args.host, &args.token));
    let mut tree = ProgressTree::new(client.clone(), client, SystemClock)
        .label(format!("Watching {} job(s)", args.ids.len()))
        .interval(Duration::from_secs(args.interval));
    for id in &args.ids {
        tree.register(JobId::new(*id), args.kind);
    }

    let display = DisplayConfig::new(args.output);
    let mut stdout = std::io::stdout();
    let mut failed: Vec<String> = Vec::new();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tree.refresh_all().await.map_err(ExitError::refresh_failed)?;

        if args.logs {
            stream_logs(&mut tree, &display, &mut stdout).await?;
        }

        render::render(&tree.rows(), &tree.indicator(), &display, &mut stdout)?;

        for node in tree.reap() {
            report_finished(&node, &display, &mut stdout)?;
            if node.failed() {
                failed.push(label(&node));
            }
        }
        if tree.is_empty() {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(args.interval)) => {}
            _ = &mut ctrl_c => {
                tracing::info!("interrupted, stopping watch");
                break;
            }
        }
    }

    if !failed.is_empty() {
        return Err(ExitError::jobs_failed(&failed).into());
    }
    Ok(())
}

/// Pull fresh log chunks and print the non-empty ones.
///
/// One job's fetch failure only costs that job's chunk this cycle; the
/// engine keeps its cursor so the next poll retries the same range.
async fn stream_logs<W: Write>(
    tree: &mut ProgressTree<ControllerClient, ControllerClient, SystemClock>,
    display: &DisplayConfig,
    out: &mut W,
) -> anyhow::Result<()> {
    for fetch in tree.fetch_logs().await {
        match fetch.result {
            Ok(chunk) => {
                if chunk.text.is_empty() {
                    continue;
                }
                match display.format {
                    OutputFormat::Json => {
                        let payload = serde_json::json!({
                            "event": "log",
                            "id": fetch.id,
                            "text": chunk.text,
                        });
                        writeln!(out, "{}", serde_json::to_string(&payload)?)?;
                    }
                    OutputFormat::Text => {
                        let header = format!("── job {} ──", fetch.id);
                        writeln!(
                            out,
                            "{}",
                            crate::color::paint(crate::color::codes::MUTED, &header, display.color)
                        )?;
                        write!(out, "{}", chunk.text)?;
                        if !chunk.text.ends_with('\n') {
                            writeln!(out)?;
                        }
                    }
                }
            }
            Err(error) => {
                eprintln!("warning: log fetch failed for job {}: {}", fetch.id, error);
            }
        }
    }
    Ok(())
}

fn label(node: &ProgressNode) -> String {
    match node.name() {
        Some(name) => format!("{} ({})", name, node.id()),
        None => format!("job {}", node.id()),
    }
}

fn report_finished<W: Write>(
    node: &ProgressNode,
    display: &DisplayConfig,
    out: &mut W,
) -> anyhow::Result<()> {
    match display.format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "event": "finished",
                "id": node.id(),
                "name": node.name(),
                "status": node.status(),
                "failed": node.failed(),
                "elapsed_secs": node.elapsed_secs(),
            });
            writeln!(out, "{}", serde_json::to_string(&payload)?)?;
        }
        OutputFormat::Text => {
            let status = node.status().map(|s| s.to_string()).unwrap_or_else(|| "done".to_string());
            let code = crate::color::status_code(node.status(), node.failed());
            writeln!(
                out,
                "{} finished: {} ({})",
                label(node),
                crate::color::paint(code, &status, display.color),
                format_elapsed(node.elapsed_secs())
            )?;
        }
    }
    Ok(())
}
