//! Validated test case model

use serde::Serialize;
use std::collections::HashMap;

use crate::common::ParseError;

/// One row of the test table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    /// Unique within a suite; also names the case's log directory
    pub id: String,
    /// Functionality under test
    pub feature: String,
    /// Detailed test conditions
    pub condition: String,
    /// Literal input data the agent should use
    pub input_values: String,
    /// Acceptance criterion
    pub expected_result: String,
    /// 1-based spreadsheet row the case was read from (header is row 1)
    #[serde(skip)]
    pub source_row: usize,
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        feature: impl Into<String>,
        condition: impl Into<String>,
        input_values: impl Into<String>,
        expected_result: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            feature: feature.into(),
            condition: condition.into(),
            input_values: input_values.into(),
            expected_result: expected_result.into(),
            source_row: 0,
        }
    }

    pub fn at_row(mut self, row: usize) -> Self {
        self.source_row = row;
        self
    }
}

/// An ordered suite of test cases with unique ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSuite {
    cases: Vec<TestCase>,
    truncated_at: Option<usize>,
}

impl TestSuite {
    /// Build a suite, rejecting repeated ids
    pub fn new(cases: Vec<TestCase>) -> Result<Self, ParseError> {
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(cases.len());
        for case in &cases {
            if let Some(first_row) = seen.insert(case.id.as_str(), case.source_row) {
                return Err(ParseError::DuplicateId {
                    id: case.id.clone(),
                    first_row,
                    row: case.source_row,
                });
            }
        }

        Ok(Self {
            cases,
            truncated_at: None,
        })
    }

    /// Record the spreadsheet row at which loading stopped
    pub fn with_truncation(mut self, row: Option<usize>) -> Self {
        self.truncated_at = row;
        self
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Spreadsheet row of the first incomplete row, if loading stopped early
    pub fn truncated_at(&self) -> Option<usize> {
        self.truncated_at
    }
}
