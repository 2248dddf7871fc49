//! CLI command definitions
//!
//! Defines the clap commands for the agentqa CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Load a test workbook and list its cases without running anything
    Check {
        /// Path to the .xlsx or .ods workbook
        file: PathBuf,
    },

    /// Print the instruction the agent would receive for each case
    Render {
        /// Path to the .xlsx or .ods workbook
        file: PathBuf,

        /// Only render the case with this id
        #[arg(long)]
        id: Option<String>,
    },

    /// Run every case of a workbook against a fresh browser session
    Run {
        /// Path to the .xlsx or .ods workbook
        file: PathBuf,

        /// Also write the results as JSON to this file
        #[arg(long, short)]
        report: Option<PathBuf>,

        /// Do not draw the live progress bar
        #[arg(long)]
        no_progress: bool,
    },
}
