//! Console rendering of a finished run

use colored::Colorize;

use super::summary::Summary;
use super::types::{CaseResult, SuiteReport};

/// Status line for one case: id plus a success/failure glyph
pub fn case_line(case: &CaseResult) -> String {
    if case.outcome.is_success() {
        format!("Test {}: {}", case.test_id, "success ✅".green())
    } else {
        format!("Test {}: {}", case.test_id, "failure ❌".red())
    }
}

/// Totals block shown under the case lines
pub fn summary_lines(summary: &Summary) -> Vec<String> {
    vec![
        format!("Total tests: {}", summary.total),
        format!("Succeeded:   {}", summary.succeeded.to_string().green()),
        format!("Failed:      {}", summary.failed.to_string().red()),
    ]
}

/// Print the full report to stdout
pub fn print_report(report: &SuiteReport) {
    println!("\n{}", "Test results".bold());

    if report.cases.is_empty() {
        println!("  {}", "No test cases were run".dimmed());
    }

    for case in &report.cases {
        println!("  {}", case_line(case));
        if let Some(reason) = case.outcome.reason() {
            println!("      {}", reason.dimmed());
        }
    }

    println!("\n{}", "Summary".bold());
    for line in summary_lines(&report.summary) {
        println!("  {}", line);
    }
}
