//! Automation agent contract
//!
//! The orchestrator never drives a browser itself. It hands a rendered
//! instruction to an [`AutomationAgent`], which works against the shared
//! [`Session`] and reports back an [`AgentOutcome`]. An `Err` from the agent
//! is a fault (crash, protocol error, provider error); a completed run that
//! did not meet the expected result is an `Ok` outcome with
//! `is_successful` unset or false.

mod bridge;
pub mod codec;
pub mod protocol;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::common::Result;
use crate::orchestrator::CaseLog;

pub use bridge::{BridgeAgent, BridgeSession};

/// Actions the agent may attempt per reasoning step
///
/// One action per step keeps every step inspectable in the conversation
/// log and bounds a case's worst-case runtime by its step budget.
pub const ACTIONS_PER_STEP: u32 = 1;

/// One case's work order for the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentTask {
    pub instruction: String,
    pub max_steps: u32,
    pub max_actions_per_step: u32,
    /// The case's log namespace directory
    pub log_dir: PathBuf,
}

/// What the agent reports after finishing a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// `None` when the agent ran out of steps without declaring a verdict
    #[serde(default)]
    pub is_successful: Option<bool>,
    #[serde(default)]
    pub action_results: Vec<Value>,
    #[serde(default)]
    pub final_result: Option<String>,
}

impl AgentOutcome {
    pub fn succeeded(&self) -> bool {
        self.is_successful == Some(true)
    }
}

/// The shared interactive resource (browser) all cases run against
#[async_trait]
pub trait Session: Send {
    /// Make the session usable for the next case, recovering it if a
    /// previous case left it dead
    async fn ensure_ready(&mut self) -> Result<()>;

    /// Tear the session down; later `ensure_ready` calls fail
    async fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;
}

/// Interprets an instruction and drives the session to completion
#[async_trait]
pub trait AutomationAgent: Send + Sync {
    type Session: Session;

    async fn run(
        &self,
        task: &AgentTask,
        session: &mut Self::Session,
        log: &mut CaseLog,
    ) -> Result<AgentOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_defaults_for_sparse_body() {
        let outcome: AgentOutcome = serde_json::from_value(json!({})).unwrap();
        assert_eq!(outcome, AgentOutcome::default());
        assert!(!outcome.succeeded());
    }

    #[test]
    fn test_outcome_success_flag() {
        let outcome: AgentOutcome = serde_json::from_value(json!({
            "is_successful": true,
            "action_results": [{"click": "#login"}],
            "final_result": "Dashboard shows Alice"
        }))
        .unwrap();
        assert!(outcome.succeeded());
        assert_eq!(outcome.action_results.len(), 1);
    }
}
