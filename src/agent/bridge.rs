//! Agent bridge: the automation agent as a child process
//!
//! The bridge owns the browser and the language model client. agentqa
//! spawns it once, sends `open` with the browser/LLM settings, then one
//! `run` per test case over the same process, so cookies and navigation
//! state persist across cases exactly as they would in a shared browser.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::orchestrator::CaseLog;

use super::codec;
use super::protocol::{Event, Message, OpenArguments, Request, RunArguments};
use super::{AgentOutcome, AgentTask, AutomationAgent, Session};

/// How long a closing bridge gets to shut its browser down
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// A running bridge process
struct BridgeProcess {
    child: Child,
    reader: BufReader<ChildStdout>,
    writer: BufWriter<ChildStdin>,
    seq: u64,
}

impl BridgeProcess {
    async fn spawn(command: &Path, args: &[String]) -> Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                Error::AgentStartFailed(format!("Failed to start {}: {}", command.display(), e))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::AgentStartFailed("Failed to get bridge stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::AgentStartFailed("Failed to get bridge stdout".to_string()))?;

        tracing::debug!(command = %command.display(), pid = ?child.id(), "Spawned agent bridge");

        Ok(Self {
            child,
            reader: BufReader::new(stdout),
            writer: BufWriter::new(stdin),
            seq: 0,
        })
    }

    fn is_running(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }

    /// Send a request and wait for its response, passing any events that
    /// arrive in the meantime to `on_event`
    async fn request<F>(
        &mut self,
        command: &str,
        arguments: Option<Value>,
        mut on_event: F,
    ) -> Result<Value>
    where
        F: FnMut(&Event) + Send,
    {
        self.seq += 1;
        let seq = self.seq;

        codec::write_json(&mut self.writer, &Request::new(seq, command, arguments)).await?;

        loop {
            match codec::read_json::<_, Message>(&mut self.reader).await? {
                Message::Response(response) if response.request_seq == seq => {
                    return if response.success {
                        Ok(response.body.unwrap_or(Value::Null))
                    } else {
                        Err(Error::agent_fault(
                            command,
                            response.message.as_deref().unwrap_or("Unknown error"),
                        ))
                    };
                }
                Message::Response(response) => {
                    tracing::warn!(
                        request_seq = response.request_seq,
                        "Ignoring response to an earlier request"
                    );
                }
                Message::Event(event) => on_event(&event),
            }
        }
    }

    /// Ask the bridge to close its browser, then make sure the process is gone
    async fn shutdown(mut self) {
        let graceful = tokio::time::timeout(CLOSE_TIMEOUT, self.request("close", None, |_| {}))
            .await;
        if !matches!(graceful, Ok(Ok(_))) {
            tracing::warn!("Agent bridge did not acknowledge close");
        }

        match tokio::time::timeout(CLOSE_TIMEOUT, self.child.wait()).await {
            Ok(Ok(status)) => tracing::debug!(%status, "Agent bridge exited"),
            _ => {
                let _ = self.child.kill().await;
            }
        }
    }
}

impl Drop for BridgeProcess {
    fn drop(&mut self) {
        // Best effort, we cannot await here
        let _ = self.child.start_kill();
    }
}

/// Shared browser session hosted by an agent bridge process
pub struct BridgeSession {
    command: PathBuf,
    args: Vec<String>,
    open_args: OpenArguments,
    process: Option<BridgeProcess>,
    closed: bool,
}

impl BridgeSession {
    /// Prepare a session without starting the bridge yet
    ///
    /// Fails if a required environment variable is missing or the bridge
    /// executable cannot be found.
    pub fn new(config: &Config) -> Result<Self> {
        for name in &config.agent.required_env {
            let present = std::env::var_os(name).is_some_and(|v| !v.is_empty());
            if !present {
                return Err(Error::MissingEnv(name.clone()));
            }
        }

        Ok(Self {
            command: config.resolve_agent_command()?,
            args: config.agent.args.clone(),
            open_args: OpenArguments {
                browser: config.browser.clone(),
                llm: config.llm.clone(),
                use_vision: config.agent.use_vision,
            },
            process: None,
            closed: false,
        })
    }

    /// Create the session and open the browser right away
    pub async fn start(config: &Config) -> Result<Self> {
        let mut session = Self::new(config)?;
        session.ensure_ready().await?;
        Ok(session)
    }

    async fn run_request(&mut self, arguments: Value, log: &mut CaseLog) -> Result<Value> {
        let process = self.process.as_mut().ok_or(Error::AgentCrashed)?;

        let result = process
            .request("run", Some(arguments), |event| {
                tracing::debug!(event = %event.event, "Agent bridge event");
                let body = event
                    .body
                    .as_ref()
                    .map(Value::to_string)
                    .unwrap_or_default();
                log.record(&format!("event: {}", event.event), &body);
            })
            .await;

        // A fault reported by the bridge leaves the stream in sync; anything
        // else (EOF, bad frame, broken pipe) means the process must be replaced
        if let Err(e) = &result {
            if !matches!(e, Error::AgentFault { .. }) {
                tracing::warn!(error = %e, "Discarding agent bridge after transport failure");
                self.process = None;
            }
        }

        result
    }
}

#[async_trait]
impl Session for BridgeSession {
    async fn ensure_ready(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::SessionClosed);
        }

        if let Some(process) = self.process.as_mut() {
            if process.is_running() {
                return Ok(());
            }
            tracing::warn!("Agent bridge exited; starting a new one");
            self.process = None;
        }

        let mut process = BridgeProcess::spawn(&self.command, &self.args).await?;
        let arguments = serde_json::to_value(&self.open_args)?;
        process.request("open", Some(arguments), |_| {}).await?;
        tracing::info!(
            headless = self.open_args.browser.headless,
            locale = %self.open_args.browser.locale,
            "Automation session opened"
        );

        self.process = Some(process);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        if let Some(process) = self.process.take() {
            process.shutdown().await;
            tracing::info!("Automation session closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.closed
    }
}

/// Agent that delegates each task to the bridge hosting the session
#[derive(Debug, Default, Clone, Copy)]
pub struct BridgeAgent;

#[async_trait]
impl AutomationAgent for BridgeAgent {
    type Session = BridgeSession;

    async fn run(
        &self,
        task: &AgentTask,
        session: &mut BridgeSession,
        log: &mut CaseLog,
    ) -> Result<AgentOutcome> {
        let arguments = serde_json::to_value(RunArguments {
            task: task.instruction.clone(),
            max_steps: task.max_steps,
            max_actions_per_step: task.max_actions_per_step,
            log_dir: task.log_dir.clone(),
        })?;

        let body = session.run_request(arguments, log).await?;
        serde_json::from_value(body)
            .map_err(|e| Error::AgentProtocol(format!("Invalid run result: {}", e)))
    }
}
