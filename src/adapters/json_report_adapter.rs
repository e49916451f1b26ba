//! JSON report adapter implementing ReportPort.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::error::SweepError;
use crate::domain::metrics::RunResult;
use crate::domain::sweep::{FailedRun, SweepReport};
use crate::ports::report_port::ReportPort;

/// Serialized layout of a report file. Non-finite numbers (an all-win
/// profit factor) are written as `null`.
#[derive(Serialize)]
struct ReportDocument<'a> {
    strategy: &'a str,
    cartesian_size: usize,
    pruned: usize,
    evaluated: usize,
    best: Option<&'a RunResult>,
    top: &'a [RunResult],
    results: &'a [RunResult],
    failures: &'a [FailedRun],
}

pub fn render(report: &SweepReport) -> Result<String, SweepError> {
    let document = ReportDocument {
        strategy: &report.strategy,
        cartesian_size: report.cartesian_size,
        pruned: report.pruned,
        evaluated: report.evaluated,
        best: report.best(),
        top: report.top(),
        results: &report.results,
        failures: &report.failures,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &SweepReport, output_path: &Path) -> Result<(), SweepError> {
        let json = render(report)?;
        fs::write(output_path, json)?;
        tracing::info!(path = %output_path.display(), "report written");
        Ok(())
    }
}
