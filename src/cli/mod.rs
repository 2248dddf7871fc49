//! CLI command handling
//!
//! Dispatches CLI commands and formats their output. stdout carries the
//! results; logs and the progress bar go to stderr.

use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::JoinHandle;

use crate::agent::{BridgeAgent, BridgeSession};
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::orchestrator::{self, EventReceiver, Orchestrator, RunSettings, SuiteEvent};
use crate::report;
use crate::suite::{self, TestSuite};
use crate::workbench::Workbench;

/// Dispatch a CLI command
///
/// `run` exits with failure when any case failed; every other command
/// succeeds unless it returns an error.
pub async fn dispatch(command: Commands, config_path: Option<&Path>) -> Result<ExitCode> {
    match command {
        Commands::Check { file } => {
            let suite = suite::load_path(&file)?;
            println!(
                "Loaded {} test case(s) from {}",
                suite.len(),
                file.display()
            );
            print_suite(&suite);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Render { file, id } => {
            let config = Config::load(config_path)?;
            let suite = suite::load_path(&file)?;
            let language = config.run.prompt_language;

            let cases: Vec<_> = match id {
                Some(id) => vec![suite.get(&id).ok_or(Error::CaseNotFound(id))?],
                None => suite.cases().iter().collect(),
            };

            for (i, case) in cases.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("{}", format!("=== {} ===", case.id).bold());
                print!("{}", language.render(case));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Run {
            file,
            report,
            no_progress,
        } => {
            let config = Config::load(config_path)?;
            let session = BridgeSession::new(&config)?;
            let orchestrator =
                Orchestrator::new(BridgeAgent, session, RunSettings::from_config(&config));
            let mut workbench = Workbench::new(orchestrator);

            let total = workbench.load_path(&file)?.len();
            println!("Loaded {} test case(s) from {}", total, file.display());
            if let Some(row) = workbench.suite().and_then(TestSuite::truncated_at) {
                print_truncation(row);
            }

            let outcome = run_loaded(&mut workbench, total, report.as_deref(), !no_progress).await;

            // The browser goes away whether or not the run worked
            if let Err(e) = workbench.close().await {
                tracing::warn!(error = %e, "Failed to close the automation session");
            }

            outcome
        }
    }
}

async fn run_loaded(
    workbench: &mut Workbench<BridgeAgent>,
    total: usize,
    report_path: Option<&Path>,
    show_progress: bool,
) -> Result<ExitCode> {
    workbench.open().await?;

    let (tx, rx) = orchestrator::events::channel();
    let progress = show_progress.then(|| spawn_progress(total, rx));

    let result = workbench.run(progress.is_some().then_some(&tx)).await;
    drop(tx);
    if let Some(handle) = progress {
        let _ = handle.await;
    }
    let suite_report = result?;

    report::print_report(suite_report);

    if let Some(path) = report_path {
        report::write_report(suite_report, path)?;
        println!("\nReport written to {}", path.display());
    }

    if suite_report.summary.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Drive a progress bar from run events until the sender goes away
fn spawn_progress(total: usize, mut rx: EventReceiver) -> JoinHandle<()> {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("  [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SuiteEvent::CaseStarted { test_id, .. } => {
                    pb.set_message(format!("running {test_id}"));
                }
                SuiteEvent::Progress(progress) => {
                    pb.set_position(progress.completed as u64);
                }
            }
        }
        pb.finish_and_clear();
    })
}

fn print_suite(suite: &TestSuite) {
    if suite.is_empty() {
        println!("  {}", "No test cases".dimmed());
    }

    for case in suite.cases() {
        println!("  {}  {}", case.id.bold(), case.feature);
        println!("      {} {}", "expect:".dimmed(), case.expected_result);
    }

    if let Some(row) = suite.truncated_at() {
        print_truncation(row);
    }
}

fn print_truncation(row: usize) {
    println!(
        "{}",
        format!(
            "Row {} has an empty required field; it and every row after it were ignored",
            row
        )
        .yellow()
    );
}
