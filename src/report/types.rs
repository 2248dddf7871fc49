use serde::{Deserialize, Serialize};

use super::summary::{aggregate, Summary};

/// Result of attempting one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Succeeded,
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl ExecutionOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: Some(reason.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Succeeded => None,
            Self::Failed { reason } => reason.as_deref(),
        }
    }
}

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub test_id: String,
    pub outcome: ExecutionOutcome,
    /// The agent's own closing statement, when it produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_result: Option<String>,
    pub duration_ms: u64,
}

/// Ordered results of one run plus their summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub cases: Vec<CaseResult>,
    pub summary: Summary,
}

impl SuiteReport {
    pub fn new(cases: Vec<CaseResult>) -> Self {
        let summary = aggregate(&cases);
        Self { cases, summary }
    }

    pub fn get(&self, test_id: &str) -> Option<&CaseResult> {
        self.cases.iter().find(|c| c.test_id == test_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_value(ExecutionOutcome::Succeeded).unwrap(),
            json!({"status": "succeeded"})
        );
        assert_eq!(
            serde_json::to_value(ExecutionOutcome::Failed { reason: None }).unwrap(),
            json!({"status": "failed"})
        );
        assert_eq!(
            serde_json::to_value(ExecutionOutcome::failed("timeout")).unwrap(),
            json!({"status": "failed", "reason": "timeout"})
        );
    }

    #[test]
    fn test_report_summary_follows_cases() {
        let report = SuiteReport::new(vec![
            CaseResult {
                test_id: "A".to_string(),
                outcome: ExecutionOutcome::Succeeded,
                final_result: None,
                duration_ms: 5,
            },
            CaseResult {
                test_id: "B".to_string(),
                outcome: ExecutionOutcome::failed("boom"),
                final_result: None,
                duration_ms: 7,
            },
        ]);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.get("B").unwrap().outcome.reason(), Some("boom"));
        assert!(report.get("C").is_none());
    }
}
