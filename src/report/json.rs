use std::path::Path;

use crate::common::{Error, Result};

use super::types::SuiteReport;

/// Write the report as pretty JSON
pub fn write_report(report: &SuiteReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json).map_err(|e| Error::FileWrite {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    tracing::info!(path = %path.display(), "Wrote JSON report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CaseResult, ExecutionOutcome};

    #[test]
    fn test_report_written_and_readable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("report.json");
        let report = SuiteReport::new(vec![CaseResult {
            test_id: "A".to_string(),
            outcome: ExecutionOutcome::failed("not met"),
            final_result: Some("Saw an error page".to_string()),
            duration_ms: 12,
        }]);

        write_report(&report, &path).unwrap();

        let back: SuiteReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, report);
    }
}
