//! Run results: per-case outcomes, totals, and their rendering

mod json;
mod render;
mod summary;
mod types;

pub use json::write_report;
pub use render::{case_line, print_report, summary_lines};
pub use summary::{aggregate, Summary};
pub use types::{CaseResult, ExecutionOutcome, SuiteReport};
