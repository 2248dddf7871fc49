//! agentqa - spreadsheet-driven test runs for a browser automation agent
//!
//! A workbook of test cases is loaded into a [`suite::TestSuite`], each case
//! is rendered into a natural-language instruction, and an
//! [`agent::AutomationAgent`] carries the instructions out one by one
//! against a single shared browser session. Every case ends up in the
//! [`report::SuiteReport`], whatever the agent did.

pub mod agent;
pub mod cli;
pub mod commands;
pub mod common;
pub mod orchestrator;
pub mod prompt;
pub mod report;
pub mod suite;
pub mod workbench;

// Re-export commonly used types for tests
pub use common::{Error, ParseError, Result};
pub use workbench::Workbench;
