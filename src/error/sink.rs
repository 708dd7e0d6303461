use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to format log entry: {source}")]
    FormatEntry {
        #[source]
        source: std::fmt::Error,
    },
    #[error("Failed to serialize report: {source}")]
    SerializeReport {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write report '{path}': {source}")]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to move report into place at '{path}': {source}")]
    CommitReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open log file '{path}': {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write log entry: {source}")]
    WriteLogEntry {
        #[source]
        source: std::io::Error,
    },
}
