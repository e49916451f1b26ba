//! Report output port trait.

use std::path::Path;

use crate::domain::error::SweepError;
use crate::domain::sweep::SweepReport;

/// Port for writing sweep reports.
pub trait ReportPort {
    fn write(&self, report: &SweepReport, output_path: &Path) -> Result<(), SweepError>;
}
