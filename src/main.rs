//! agentqa - spreadsheet-driven test runs for a browser automation agent
//!
//! Loads test cases from a workbook, has an automation agent carry each one
//! out in a shared browser session, and prints a per-case verdict.

use std::path::PathBuf;
use std::process::ExitCode;

use agentqa::common::logging;
use agentqa::{cli, commands::Commands};
use clap::Parser;
use colored::Colorize;

#[derive(Parser)]
#[command(name = "agentqa", about = "Run spreadsheet test cases with a browser automation agent")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Held until exit so buffered file logs get flushed
    let _guard = logging::init_cli();

    let cli = Cli::parse();

    match cli::dispatch(cli.command, cli.config.as_deref()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
