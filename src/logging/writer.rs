use std::path::{Path, PathBuf};

use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncWriteExt, BufWriter},
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::warn;

use super::entry::LogEntry;
use super::redact::Redactor;
use crate::error::SinkError;

enum Command {
    Write(String),
    Flush(oneshot::Sender<()>),
}

/// Thread-safe, non-blocking logger for request/response entries.
///
/// Submitting an entry costs one redaction pass and an in-memory enqueue; a
/// background task drains the queue and appends whole blocks to the log file,
/// so entries from concurrent executions never interleave mid-entry. Entries
/// are written in drain order (FIFO per queue); cross-task submission order
/// is only guaranteed up to each caller's enqueue point.
///
/// Sink failures are reported through `tracing::warn!` and the affected
/// entries dropped; logging never fails the request under observation.
#[derive(Debug)]
pub struct RequestLogger {
    tx: mpsc::UnboundedSender<Command>,
    redactor: Redactor,
    writer: JoinHandle<()>,
}

impl RequestLogger {
    #[must_use]
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self::with_redactor(path, Redactor::default())
    }

    #[must_use]
    pub fn with_redactor(path: impl Into<PathBuf>, redactor: Redactor) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = spawn_writer(path.into(), rx);
        Self {
            tx,
            redactor,
            writer,
        }
    }

    pub fn log_request(&self, entry: LogEntry) {
        self.submit(entry);
    }

    pub fn log_response(&self, entry: LogEntry) {
        self.submit(entry);
    }

    /// Waits until every previously submitted entry is durably written.
    ///
    /// Used at session teardown; safe to call repeatedly.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_err() {
            return;
        }
        drop(ack_rx.await);
    }

    /// Drains the queue and stops the writer task.
    pub async fn shutdown(self) {
        self.flush().await;
        drop(self.tx);
        drop(self.writer.await);
    }

    fn submit(&self, mut entry: LogEntry) {
        entry.headers = self.redactor.redact_headers(&entry.headers);
        entry.body = entry
            .body
            .as_ref()
            .map(|body| self.redactor.redact_json(body));

        match entry.render() {
            Ok(block) => {
                if self.tx.send(Command::Write(block)).is_err() {
                    warn!("Log writer is gone; dropping entry.");
                }
            }
            Err(err) => {
                warn!("Failed to format log entry: {}", err);
            }
        }
    }
}

fn spawn_writer(path: PathBuf, mut rx: mpsc::UnboundedReceiver<Command>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut writer: Option<BufWriter<File>> = None;
        let mut last_sink_error: Option<String> = None;

        while let Some(command) = rx.recv().await {
            match command {
                Command::Write(block) => {
                    if writer.is_none() {
                        match open_log_file(&path).await {
                            Ok(file) => writer = Some(BufWriter::new(file)),
                            Err(err) => {
                                report_sink_error(&mut last_sink_error, &err.to_string());
                                continue;
                            }
                        }
                    }
                    if let Some(active) = writer.as_mut() {
                        match active.write_all(block.as_bytes()).await {
                            Ok(()) => {
                                last_sink_error = None;
                            }
                            Err(err) => {
                                let err = SinkError::WriteLogEntry { source: err };
                                report_sink_error(&mut last_sink_error, &err.to_string());
                                writer = None;
                            }
                        }
                    }
                }
                Command::Flush(ack) => {
                    if let Some(active) = writer.as_mut()
                        && let Err(err) = active.flush().await
                    {
                        let err = SinkError::WriteLogEntry { source: err };
                        report_sink_error(&mut last_sink_error, &err.to_string());
                        writer = None;
                    }
                    drop(ack.send(()));
                }
            }
        }

        if let Some(active) = writer.as_mut() {
            drop(active.flush().await);
        }
    })
}

async fn open_log_file(path: &Path) -> Result<File, SinkError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| SinkError::OpenLogFile {
                path: path.to_path_buf(),
                source: err,
            })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|err| SinkError::OpenLogFile {
            path: path.to_path_buf(),
            source: err,
        })
}

fn report_sink_error(last_sink_error: &mut Option<String>, message: &str) {
    if last_sink_error.as_deref() != Some(message) {
        warn!("Failed to write log sink: {}", message);
        *last_sink_error = Some(message.to_owned());
    }
}
