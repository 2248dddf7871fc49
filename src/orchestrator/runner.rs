//! Suite execution
//!
//! Cases run one after another against the single shared session. Each
//! case is supervised: whatever the agent does (reports failure, returns an
//! error, panics) the supervisor turns it into an [`ExecutionOutcome`] and
//! the loop moves on to the next case.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::time::Instant;

use futures_util::FutureExt;
use tracing::Instrument;

use crate::agent::{AgentOutcome, AgentTask, AutomationAgent, Session, ACTIONS_PER_STEP};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::prompt::PromptLanguage;
use crate::report::{CaseResult, ExecutionOutcome, SuiteReport};
use crate::suite::{TestCase, TestSuite};

use super::events::{CaseState, EventSender, ProgressEvent, SuiteEvent, SuiteState};
use super::namespace::{CaseLog, LogNamespaces};

/// Per-run knobs taken from the configuration
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Step budget per case
    pub max_steps: u32,
    /// Root of the per-case log namespaces
    pub log_root: PathBuf,
    pub prompt_language: PromptLanguage,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_steps: config.agent.max_steps,
            log_root: config.run.log_root.clone(),
            prompt_language: config.run.prompt_language,
        }
    }
}

/// Drives test suites against one shared automation session
pub struct Orchestrator<A: AutomationAgent> {
    agent: A,
    session: A::Session,
    settings: RunSettings,
    namespaces: LogNamespaces,
    state: SuiteState,
    case_states: Vec<(String, CaseState)>,
}

impl<A: AutomationAgent> Orchestrator<A> {
    /// Take ownership of the session for the orchestrator's lifetime
    pub fn new(agent: A, session: A::Session, settings: RunSettings) -> Self {
        let namespaces = LogNamespaces::new(settings.log_root.clone());
        Self {
            agent,
            session,
            settings,
            namespaces,
            state: SuiteState::Idle,
            case_states: Vec::new(),
        }
    }

    pub fn state(&self) -> SuiteState {
        self.state
    }

    /// State of every case of the current (or last) run, in suite order
    pub fn case_states(&self) -> &[(String, CaseState)] {
        &self.case_states
    }

    pub fn session(&self) -> &A::Session {
        &self.session
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run every case of `suite` in order
    ///
    /// Always returns one result per case. `events`, when given, receives a
    /// `CaseStarted` before and a `Progress` after every case.
    pub async fn run_suite(
        &mut self,
        suite: &TestSuite,
        events: Option<&EventSender>,
    ) -> SuiteReport {
        let total = suite.len();
        self.state = SuiteState::Running;
        self.case_states = suite
            .cases()
            .iter()
            .map(|c| (c.id.clone(), CaseState::Pending))
            .collect();

        tracing::info!(total, "Starting test run");
        let mut results = Vec::with_capacity(total);

        for (index, case) in suite.cases().iter().enumerate() {
            emit(
                events,
                SuiteEvent::CaseStarted {
                    index,
                    total,
                    test_id: case.id.clone(),
                },
            );
            self.case_states[index].1 = CaseState::Running;

            let span = tracing::info_span!("case", test_id = %case.id);
            let result = self.supervise_case(case).instrument(span).await;

            self.case_states[index].1 = if result.outcome.is_success() {
                CaseState::Succeeded
            } else {
                CaseState::Failed
            };
            results.push(result);

            emit(
                events,
                SuiteEvent::Progress(ProgressEvent {
                    completed: index + 1,
                    total,
                    current_test_id: case.id.clone(),
                }),
            );
        }

        self.state = SuiteState::Completed;
        let report = SuiteReport::new(results);
        tracing::info!(
            total = report.summary.total,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            "Test run completed"
        );
        report
    }

    /// Run one case and convert whatever happens into a result
    async fn supervise_case(&mut self, case: &TestCase) -> CaseResult {
        let started = Instant::now();
        tracing::info!("Running test case");

        let instruction = self.settings.prompt_language.render(case);

        let (outcome, final_result) = match self.namespaces.open(&case.id) {
            Ok(mut log) => {
                log.record("instruction", &instruction);

                let task = AgentTask {
                    instruction,
                    max_steps: self.settings.max_steps,
                    max_actions_per_step: ACTIONS_PER_STEP,
                    log_dir: log.dir().to_path_buf(),
                };

                let attempt =
                    AssertUnwindSafe(invoke(&self.agent, &mut self.session, &task, &mut log))
                        .catch_unwind()
                        .await;

                match attempt {
                    Ok(Ok(agent_outcome)) => {
                        tracing::info!(
                            is_successful = ?agent_outcome.is_successful,
                            actions = agent_outcome.action_results.len(),
                            final_result = ?agent_outcome.final_result,
                            "Agent finished"
                        );
                        log.record(
                            "outcome",
                            &serde_json::to_string_pretty(&agent_outcome).unwrap_or_default(),
                        );
                        judge(agent_outcome)
                    }
                    Ok(Err(e)) => fault(&mut log, e),
                    Err(payload) => fault(&mut log, Error::AgentPanicked(panic_message(payload))),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not open the case log namespace");
                (
                    ExecutionOutcome::failed(format!("Could not create log namespace: {}", e)),
                    None,
                )
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        if outcome.is_success() {
            tracing::info!(duration_ms, "Test case succeeded");
        } else {
            tracing::warn!(duration_ms, reason = ?outcome.reason(), "Test case failed");
        }

        CaseResult {
            test_id: case.id.clone(),
            outcome,
            final_result,
            duration_ms,
        }
    }

    /// Bring the shared session up ahead of the first case
    pub async fn open(&mut self) -> Result<()> {
        self.session.ensure_ready().await
    }

    /// Tear down the shared session
    ///
    /// Only reachable between runs: `run_suite` holds `&mut self` for the
    /// whole run.
    pub async fn close(&mut self) -> Result<()> {
        self.session.close().await
    }
}

async fn invoke<A: AutomationAgent>(
    agent: &A,
    session: &mut A::Session,
    task: &AgentTask,
    log: &mut CaseLog,
) -> Result<AgentOutcome> {
    session.ensure_ready().await?;
    agent.run(task, session, log).await
}

fn judge(outcome: AgentOutcome) -> (ExecutionOutcome, Option<String>) {
    if outcome.succeeded() {
        return (ExecutionOutcome::Succeeded, outcome.final_result);
    }

    let reason = match (&outcome.final_result, outcome.is_successful) {
        (Some(text), _) => text.clone(),
        (None, Some(false)) => "Agent reported that the expected result was not met".to_string(),
        (None, _) => "Agent stopped without reporting a verdict".to_string(),
    };
    (ExecutionOutcome::failed(reason), outcome.final_result)
}

fn fault(log: &mut CaseLog, error: Error) -> (ExecutionOutcome, Option<String>) {
    tracing::error!(error = %error, "Agent fault");
    log.record("fault", &error.to_string());
    (ExecutionOutcome::failed(error.to_string()), None)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn emit(events: Option<&EventSender>, event: SuiteEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is watching
        let _ = tx.send(event);
    }
}
