//! Test suite execution engine
//!
//! Runs every case of a suite against the shared automation session,
//! strictly one at a time, and streams progress while doing so.

pub mod events;
mod namespace;
mod runner;

pub use events::{CaseState, EventReceiver, EventSender, ProgressEvent, SuiteEvent, SuiteState};
pub use namespace::{CaseLog, LogNamespaces, CONVERSATION_FILE};
pub use runner::{Orchestrator, RunSettings};
