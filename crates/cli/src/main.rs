// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tow: watch remote automation-controller jobs from the terminal.

mod color;
mod exit_error;
mod render;
mod watch;

use clap::{Parser, Subcommand};
use exit_error::ExitError;

#[derive(Parser)]
#[command(
    name = "tow",
    version,
    about = "Watch remote automation-controller jobs from the terminal",
    styles = color::styles()
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch jobs until every one of them completes
    Watch(watch::WatchArgs),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Watch(args) => watch::run(args).await,
    };

    if let Err(err) = result {
        match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("{}", exit);
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("error: {:#}", err);
                std::process::exit(1);
            }
        }
    }
}
