use serde::Serialize;
use tokio::sync::mpsc;

/// Emitted after each case finishes, whatever its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// Cases finished so far in this run, 1..=total
    pub completed: usize,
    pub total: usize,
    pub current_test_id: String,
}

/// Live run events for a presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SuiteEvent {
    /// A case is about to run (`index` is 0-based)
    CaseStarted {
        index: usize,
        total: usize,
        test_id: String,
    },
    Progress(ProgressEvent),
}

pub type EventSender = mpsc::UnboundedSender<SuiteEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SuiteEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Lifecycle of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteState {
    Idle,
    Running,
    Completed,
}

/// Lifecycle of one case within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    Pending,
    Running,
    Succeeded,
    Failed,
}
