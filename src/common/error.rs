//! Error types for agentqa
//!
//! Suite-level errors stop a run before any case executes. Agent-level
//! errors are contained by the orchestrator and surface only as failed
//! cases in the report.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while turning a workbook into a test suite
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unsupported file format '{extension}'. Upload an .xlsx or .ods file")]
    UnsupportedFormat { extension: String },

    #[error("Failed to decode test table: {detail}")]
    DecodeFailure { detail: String },

    #[error("Duplicate test case id '{id}' (rows {first_row} and {row})")]
    DuplicateId {
        id: String,
        first_row: usize,
        row: usize,
    },
}

impl ParseError {
    pub fn decode<S: Into<String>>(detail: S) -> Self {
        Self::DecodeFailure {
            detail: detail.into(),
        }
    }
}

/// Main error type for agentqa
#[derive(Error, Debug)]
pub enum Error {
    // === Suite Errors ===
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("No test suite loaded. Load an .xlsx or .ods file before running")]
    NoSuiteLoaded,

    #[error("Test case '{0}' not found in the suite")]
    CaseNotFound(String),

    // === Session Errors ===
    #[error("Automation session is closed. Start agentqa again to open a new one")]
    SessionClosed,

    #[error("Required environment variable '{0}' is not set")]
    MissingEnv(String),

    // === Agent Errors ===
    #[error("Agent command '{name}' not found in PATH")]
    AgentNotFound { name: String },

    #[error("Agent bridge failed to start: {0}")]
    AgentStartFailed(String),

    #[error("Agent bridge exited unexpectedly")]
    AgentCrashed,

    #[error("Agent protocol error: {0}")]
    AgentProtocol(String),

    #[error("Agent request '{command}' failed: {message}")]
    AgentFault { command: String, message: String },

    #[error("Agent panicked: {0}")]
    AgentPanicked(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an agent fault error for a failed bridge request
    pub fn agent_fault(command: &str, message: &str) -> Self {
        Self::AgentFault {
            command: command.to_string(),
            message: message.to_string(),
        }
    }
}
