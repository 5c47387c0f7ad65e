// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! desim: simulate desynchronization algorithms over multi-hop graphs.

mod commands;
mod exit_error;

use clap::{Parser, Subcommand};

use exit_error::ExitError;

#[derive(Parser)]
#[command(
    name = "desim",
    version,
    about = "Simulate desynchronization algorithms over multi-hop graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one simulation instance or a graph x seed batch
    Simulate(commands::simulate::SimulateArgs),
    /// Derive metrics from simulation logs
    Analyze(commands::analyze::AnalyzeArgs),
    /// Report statistics for a graph directory
    GraphInfo(commands::graph_info::GraphInfoArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Simulate(args) => commands::simulate::run(args).await,
        Command::Analyze(args) => commands::analyze::run(args),
        Command::GraphInfo(args) => commands::graph_info::run(args),
    };

    if let Err(err) = result {
        match err.downcast::<ExitError>() {
            Ok(exit) => {
                eprintln!("{}", exit.message);
                std::process::exit(exit.code);
            }
            Err(other) => {
                eprintln!("{other:#}");
                std::process::exit(1);
            }
        }
    }
}
