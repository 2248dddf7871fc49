//! Raw table to validated suite
//!
//! Blank separator rows are dropped first. The suite then ends at the first
//! row that still has an empty required field: that row and everything
//! below it are discarded, so the offending row is always the one right
//! after the last loaded case.

use std::path::Path;

use crate::common::ParseError;

use super::case::{TestCase, TestSuite};
use super::table::{self, RawRow, RawTable};

/// Required columns, in rendering order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Feature,
    Condition,
    InputValues,
    ExpectedResult,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Id,
        Column::Feature,
        Column::Condition,
        Column::InputValues,
        Column::ExpectedResult,
    ];

    /// Header spelling shown in error messages
    pub fn label(self) -> &'static str {
        match self {
            Column::Id => "Test Case ID",
            Column::Feature => "Feature",
            Column::Condition => "Condition",
            Column::InputValues => "Input Values",
            Column::ExpectedResult => "Expected Result",
        }
    }

    /// Accepted header spellings, already normalized
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Id => &["testcaseid", "id", "테스트케이스id"],
            Column::Feature => &["feature", "기능"],
            Column::Condition => &["condition", "testcondition", "테스트조건"],
            Column::InputValues => &["inputvalues", "inputvalue", "input", "입력값"],
            Column::ExpectedResult => &["expectedresult", "기대결과"],
        }
    }
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Position of each required column within the table
#[derive(Debug)]
struct ColumnMap([usize; 5]);

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self, ParseError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let mut indices = [0usize; 5];

        for (slot, column) in indices.iter_mut().zip(Column::ALL) {
            *slot = normalized
                .iter()
                .position(|h| column.aliases().contains(&h.as_str()))
                .ok_or_else(|| {
                    ParseError::decode(format!("missing required column '{}'", column.label()))
                })?;
        }

        Ok(Self(indices))
    }

    fn fields<'a>(&self, row: &'a RawRow) -> [Option<&'a str>; 5] {
        self.0.map(|index| row.cell(index))
    }
}

/// Load a suite from an `.xlsx` or `.ods` workbook
pub fn load_path(path: &Path) -> Result<TestSuite, ParseError> {
    let table = table::read_workbook(path)?;
    load(&table)
}

/// Convert a decoded table into a validated suite
pub fn load(table: &RawTable) -> Result<TestSuite, ParseError> {
    let columns = ColumnMap::resolve(&table.headers)?;

    let rows: Vec<(&RawRow, [Option<&str>; 5])> = table
        .rows
        .iter()
        .map(|row| (row, columns.fields(row)))
        .filter(|(_, fields)| fields.iter().any(Option::is_some))
        .collect();

    let cutoff = rows
        .iter()
        .position(|(_, fields)| fields.iter().any(Option::is_none));

    let truncated_at = cutoff.map(|index| rows[index].0.row);
    if let Some(row) = truncated_at {
        tracing::warn!(
            row,
            kept = cutoff.unwrap_or_default(),
            "Row has an empty required field; ignoring it and every row below"
        );
    }

    let cases = rows[..cutoff.unwrap_or(rows.len())]
        .iter()
        .map(|(row, fields)| to_case(row, fields))
        .collect::<Result<Vec<_>, _>>()?;

    let suite = TestSuite::new(cases)?.with_truncation(truncated_at);
    tracing::info!(cases = suite.len(), "Loaded test suite");
    Ok(suite)
}

fn to_case(row: &RawRow, fields: &[Option<&str>; 5]) -> Result<TestCase, ParseError> {
    let field = |column: Column| {
        fields[column as usize].map(str::to_string).ok_or_else(|| {
            ParseError::decode(format!("row {} has no '{}'", row.row, column.label()))
        })
    };

    Ok(TestCase::new(
        field(Column::Id)?,
        field(Column::Feature)?,
        field(Column::Condition)?,
        field(Column::InputValues)?,
        field(Column::ExpectedResult)?,
    )
    .at_row(row.row))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: [&str; 5] = ["Test Case ID", "Feature", "Condition", "Input Values", "Expected Result"];

    fn complete(id: &str) -> Vec<String> {
        vec![
            id.to_string(),
            format!("feature {id}"),
            format!("condition {id}"),
            format!("input {id}"),
            format!("expected {id}"),
        ]
    }

    fn blank() -> Vec<String> {
        vec![String::new(); 5]
    }

    fn ids(suite: &TestSuite) -> Vec<&str> {
        suite.cases().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_truncates_at_first_incomplete_row() {
        let mut incomplete = complete("C");
        incomplete[3] = String::new();
        let table = RawTable::from_text(
            HEADERS,
            vec![complete("A"), complete("B"), incomplete, complete("D")],
        );

        let suite = load(&table).unwrap();
        assert_eq!(ids(&suite), vec!["A", "B"]);
        assert_eq!(suite.truncated_at(), Some(4));
    }

    #[test]
    fn test_blank_rows_are_removed_not_truncation_points() {
        let table = RawTable::from_text(
            HEADERS,
            vec![complete("A"), blank(), complete("B"), blank(), blank()],
        );

        let suite = load(&table).unwrap();
        assert_eq!(ids(&suite), vec!["A", "B"]);
        assert_eq!(suite.truncated_at(), None);
        assert_eq!(suite.get("B").unwrap().source_row, 4);
    }

    #[test]
    fn test_blank_row_before_incomplete_row() {
        let mut scratch = blank();
        scratch[1] = "note to self".to_string();
        let table = RawTable::from_text(
            HEADERS,
            vec![complete("A"), blank(), scratch, complete("B")],
        );

        let suite = load(&table).unwrap();
        assert_eq!(ids(&suite), vec!["A"]);
        assert_eq!(suite.truncated_at(), Some(4));
    }

    #[test]
    fn test_first_row_incomplete_yields_empty_suite() {
        let mut incomplete = complete("A");
        incomplete[0] = String::new();
        let table = RawTable::from_text(HEADERS, vec![incomplete, complete("B")]);

        let suite = load(&table).unwrap();
        assert!(suite.is_empty());
        assert_eq!(suite.truncated_at(), Some(2));
    }

    #[test]
    fn test_extra_columns_do_not_affect_truncation() {
        let headers = ["Priority", "Test Case ID", "Feature", "Condition", "Input Values", "Expected Result", "Notes"];
        let row = |id: &str, notes: &str| {
            let mut cells = vec![String::new()];
            cells.extend(complete(id));
            cells.push(notes.to_string());
            cells
        };
        let table = RawTable::from_text(headers, vec![row("A", ""), row("B", "flaky")]);

        let suite = load(&table).unwrap();
        assert_eq!(ids(&suite), vec!["A", "B"]);
        assert_eq!(suite.cases()[0].feature, "feature A");
    }

    #[test]
    fn test_korean_headers() {
        let headers = ["테스트 케이스 ID", "기능", "테스트 조건", "입력 값", "기대 결과"];
        let table = RawTable::from_text(headers, vec![complete("TC-1")]);

        let suite = load(&table).unwrap();
        let case = &suite.cases()[0];
        assert_eq!(case.id, "TC-1");
        assert_eq!(case.input_values, "input TC-1");
        assert_eq!(case.expected_result, "expected TC-1");
    }

    #[test]
    fn test_header_matching_ignores_case_and_separators() {
        let headers = ["test_case_id", "FEATURE", "condition", "input-values", "Expected  Result"];
        let table = RawTable::from_text(headers, vec![complete("A")]);
        assert_eq!(ids(&load(&table).unwrap()), vec!["A"]);
    }

    #[test]
    fn test_missing_column_is_decode_failure() {
        let table = RawTable::from_text(["Test Case ID", "Feature"], vec![vec!["A", "f"]]);
        let err = load(&table).unwrap_err();
        assert_eq!(
            err,
            ParseError::decode("missing required column 'Condition'")
        );
    }

    #[test]
    fn test_duplicate_id_among_kept_rows() {
        let table = RawTable::from_text(HEADERS, vec![complete("A"), complete("B"), complete("A")]);
        let err = load(&table).unwrap_err();
        assert_eq!(
            err,
            ParseError::DuplicateId {
                id: "A".to_string(),
                first_row: 2,
                row: 4
            }
        );
    }

    #[test]
    fn test_duplicate_id_below_cutoff_is_ignored() {
        let mut incomplete = complete("X");
        incomplete[4] = String::new();
        let table = RawTable::from_text(HEADERS, vec![complete("A"), incomplete, complete("A")]);
        assert_eq!(ids(&load(&table).unwrap()), vec!["A"]);
    }

    #[test]
    fn test_short_rows_count_as_missing_fields() {
        let table = RawTable::from_text(
            HEADERS,
            vec![complete("A"), vec!["B".to_string(), "f".to_string()]],
        );
        let suite = load(&table).unwrap();
        assert_eq!(ids(&suite), vec!["A"]);
        assert_eq!(suite.truncated_at(), Some(3));
    }

    #[test]
    fn test_empty_table() {
        let table = RawTable::from_text(HEADERS, Vec::<Vec<String>>::new());
        let suite = load(&table).unwrap();
        assert!(suite.is_empty());
    }
}
