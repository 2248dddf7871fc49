use serde::{Deserialize, Serialize};

use super::types::CaseResult;

/// Totals over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Fold per-case outcomes into totals
pub fn aggregate(cases: &[CaseResult]) -> Summary {
    let total = cases.len();
    let succeeded = cases.iter().filter(|c| c.outcome.is_success()).count();

    Summary {
        total,
        succeeded,
        failed: total - succeeded,
    }
}
