//! Load / run / close controller
//!
//! A front end (the CLI, or any other presentation layer) drives agentqa
//! through these three calls. `run` and `close` both need `&mut self`, so a
//! session can never be closed while a run is in progress.

use std::path::Path;

use crate::agent::{AutomationAgent, Session};
use crate::common::{Error, Result};
use crate::orchestrator::{EventSender, Orchestrator};
use crate::report::SuiteReport;
use crate::suite::{self, RawTable, TestSuite};

pub struct Workbench<A: AutomationAgent> {
    orchestrator: Orchestrator<A>,
    suite: Option<TestSuite>,
    last_report: Option<SuiteReport>,
}

impl<A: AutomationAgent> Workbench<A> {
    pub fn new(orchestrator: Orchestrator<A>) -> Self {
        Self {
            orchestrator,
            suite: None,
            last_report: None,
        }
    }

    /// Load a suite from a workbook, replacing the current one
    ///
    /// On error the previously loaded suite stays in place.
    pub fn load_path(&mut self, path: &Path) -> Result<&TestSuite> {
        let suite = suite::load_path(path)?;
        Ok(self.suite.insert(suite))
    }

    /// Load a suite from an already decoded table
    pub fn load_table(&mut self, table: &RawTable) -> Result<&TestSuite> {
        let suite = suite::load(table)?;
        Ok(self.suite.insert(suite))
    }

    pub fn suite(&self) -> Option<&TestSuite> {
        self.suite.as_ref()
    }

    pub fn orchestrator(&self) -> &Orchestrator<A> {
        &self.orchestrator
    }

    /// Run the loaded suite; the new report replaces the previous one
    pub async fn run(&mut self, events: Option<&EventSender>) -> Result<&SuiteReport> {
        let suite = self.suite.as_ref().ok_or(Error::NoSuiteLoaded)?;
        if !self.orchestrator.session().is_open() {
            return Err(Error::SessionClosed);
        }

        let report = self.orchestrator.run_suite(suite, events).await;
        Ok(self.last_report.insert(report))
    }

    pub fn last_report(&self) -> Option<&SuiteReport> {
        self.last_report.as_ref()
    }

    /// Open the shared session now instead of on the first case
    pub async fn open(&mut self) -> Result<()> {
        self.orchestrator.open().await
    }

    /// Close the shared session
    pub async fn close(&mut self) -> Result<()> {
        self.orchestrator.close().await
    }
}
