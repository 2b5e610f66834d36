use super::report::AssessmentReport;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

pub const REPORT_FILE_PREFIX: &str = "GPAI_Assessment_";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write assessment report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode assessment report as CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("assessment report CSV is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Serializes finalized reports as a header row plus a single record.
pub struct ReportExporter;

impl ReportExporter {
    pub fn to_writer<W: Write>(report: &AssessmentReport, writer: W) -> Result<(), ExportError> {
        let fields = report.fields();
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(fields.iter().map(|field| field.column.as_str()))?;
        csv_writer.write_record(fields.iter().map(|field| field.value.as_str()))?;
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(report: &AssessmentReport) -> Result<String, ExportError> {
        let mut buffer = Vec::new();
        Self::to_writer(report, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Write the report into `dir` under its derived file name, creating the directory if needed.
    pub fn write_to_dir(report: &AssessmentReport, dir: &Path) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(report_file_name(&report.identity.model_name));
        let file = File::create(&path)?;
        Self::to_writer(report, file)?;
        info!(path = %path.display(), "assessment report exported");
        Ok(path)
    }
}

/// Download file name for a model identifier, restricted to filesystem-safe characters.
pub fn report_file_name(model_name: &str) -> String {
    let sanitized: String = model_name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect();

    let stem = sanitized.trim_matches('.');
    if stem.is_empty() {
        format!("{REPORT_FILE_PREFIX}unnamed.csv")
    } else {
        format!("{REPORT_FILE_PREFIX}{stem}.csv")
    }
}
