use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::SinkError;
use crate::metrics::{MetricsAggregator, MetricsSnapshot, TestRecord};

use super::format::{csv_field, csv_timestamp};

const CSV_HEADER: &str =
    "test_name,test_class,status,execution_time,timestamp,endpoint,method,response_code,error_message\n";

/// Serializes aggregated metrics and individual results to export files.
///
/// Exports read a point-in-time snapshot, never holding the aggregator's
/// lock across I/O, so an export never blocks in-flight test execution.
#[derive(Debug, Clone)]
pub struct Reporter {
    aggregator: Arc<MetricsAggregator>,
}

impl Reporter {
    #[must_use]
    pub const fn new(aggregator: Arc<MetricsAggregator>) -> Self {
        Self { aggregator }
    }

    /// Writes the JSON report (`metrics` + `results`) to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when serialization or the file write fails; on
    /// failure no partial file is left at `path`.
    pub async fn export_json(&self, path: impl AsRef<Path>) -> Result<(), SinkError> {
        export_json(path, &self.aggregator.snapshot(), &self.aggregator.records()).await
    }

    /// Writes the CSV report (one row per test record) to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file write fails; on failure no partial
    /// file is left at `path`.
    pub async fn export_csv(&self, path: impl AsRef<Path>) -> Result<(), SinkError> {
        export_csv(path, &self.aggregator.records()).await
    }
}

/// Serializes a snapshot plus records to JSON at `path`, atomically.
///
/// # Errors
///
/// Returns an error when serialization or the file write fails.
pub async fn export_json(
    path: impl AsRef<Path>,
    snapshot: &MetricsSnapshot,
    records: &[TestRecord],
) -> Result<(), SinkError> {
    let report = serde_json::json!({
        "metrics": snapshot,
        "results": records,
    });
    let payload = serde_json::to_vec_pretty(&report)
        .map_err(|err| SinkError::SerializeReport { source: err })?;
    commit_atomically(path.as_ref(), &payload).await
}

/// Serializes records to CSV at `path`, atomically.
///
/// # Errors
///
/// Returns an error when formatting or the file write fails.
pub async fn export_csv(path: impl AsRef<Path>, records: &[TestRecord]) -> Result<(), SinkError> {
    let mut output = String::with_capacity(CSV_HEADER.len() + records.len() * 96);
    output.push_str(CSV_HEADER);
    for record in records {
        let status = match record.status {
            crate::metrics::TestStatus::Success => "SUCCESS",
            crate::metrics::TestStatus::Failed => "FAILED",
            crate::metrics::TestStatus::Error => "ERROR",
        };
        writeln!(
            output,
            "{},{},{},{},{},{},{},{},{}",
            csv_field(&record.test_name),
            csv_field(&record.test_class),
            status,
            record.execution_time,
            csv_timestamp(record.timestamp),
            csv_field(&record.endpoint),
            record.method,
            record
                .response_code
                .map_or_else(String::new, |code| code.to_string()),
            csv_field(record.error_message.as_deref().unwrap_or_default()),
        )
        .map_err(|err| SinkError::FormatEntry { source: err })?;
    }
    commit_atomically(path.as_ref(), output.as_bytes()).await
}

/// Write-to-temp-then-rename so a failed export leaves either the previous
/// file or nothing, never a truncated report.
async fn commit_atomically(path: &Path, payload: &[u8]) -> Result<(), SinkError> {
    let tmp_path = tmp_sibling(path);
    if let Err(err) = tokio::fs::write(&tmp_path, payload).await {
        drop(tokio::fs::remove_file(&tmp_path).await);
        return Err(SinkError::WriteReport {
            path: path.to_path_buf(),
            source: err,
        });
    }
    if let Err(err) = tokio::fs::rename(&tmp_path, path).await {
        drop(tokio::fs::remove_file(&tmp_path).await);
        return Err(SinkError::CommitReport {
            path: path.to_path_buf(),
            source: err,
        });
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut file_name = path.file_name().map_or_else(
        || std::ffi::OsString::from("report"),
        std::ffi::OsStr::to_os_string,
    );
    file_name.push(".tmp");
    path.with_file_name(file_name)
}
