//! odsrc CLI - disposable Odoo instance provisioning.
//!
//! Acquires Odoo Enterprise source archives (download, cache, extract) so
//! instance directories can be assembled around them.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod render;

use clap::Parser;
use commands::{Cli, Commands};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 if cli.quiet => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_command(&cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_command(cli: &Cli) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Commands::Fetch(args) => commands::fetch::run(args.clone(), cli.quiet).await,
        Commands::Cache(command) => commands::cache::run(command.clone()),
    }
}
