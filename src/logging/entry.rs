use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::SinkError;
use crate::http::Method;

const ENTRY_SEPARATOR: &str = "----------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

/// One structured log record, write-once.
///
/// Headers and body are stored already redacted; the writer task only
/// formats and appends.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub status: Option<u16>,
    pub elapsed_ms: Option<u64>,
    pub error: Option<String>,
}

impl LogEntry {
    #[must_use]
    pub fn request(
        method: Method,
        url: String,
        headers: BTreeMap<String, String>,
        body: Option<Value>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            direction: Direction::Request,
            method,
            url,
            headers,
            body,
            status: None,
            elapsed_ms: None,
            error: None,
        }
    }

    #[must_use]
    pub fn response(
        method: Method,
        url: String,
        status: u16,
        elapsed_ms: u64,
        body: Option<Value>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            direction: Direction::Response,
            method,
            url,
            headers: BTreeMap::new(),
            body,
            status: Some(status),
            elapsed_ms: Some(elapsed_ms),
            error: None,
        }
    }

    #[must_use]
    pub fn transport_error(method: Method, url: String, elapsed_ms: u64, error: String) -> Self {
        Self {
            timestamp: Utc::now(),
            direction: Direction::Response,
            method,
            url,
            headers: BTreeMap::new(),
            body: None,
            status: None,
            elapsed_ms: Some(elapsed_ms),
            error: Some(error),
        }
    }

    /// Renders the canonical line-oriented text block for the log sink.
    ///
    /// # Errors
    ///
    /// Returns an error if formatting into the output buffer fails.
    pub fn render(&self) -> Result<String, SinkError> {
        let mut output = String::new();
        let timestamp = self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

        match self.direction {
            Direction::Request => {
                write_line(&mut output, &format!("[{}] REQUEST:", timestamp))?;
                write_line(&mut output, &format!("{} {}", self.method, self.url))?;
                for (key, value) in &self.headers {
                    write_line(&mut output, &format!("{}: {}", key, value))?;
                }
                if let Some(body) = self.body.as_ref() {
                    write_line(&mut output, &format!("Body: {}", render_body(body)))?;
                }
            }
            Direction::Response => {
                let elapsed = self.elapsed_ms.unwrap_or(0);
                write_line(
                    &mut output,
                    &format!("[{}] RESPONSE ({}ms):", timestamp, elapsed),
                )?;
                match (self.status, self.error.as_deref()) {
                    (Some(status), _) => {
                        write_line(&mut output, &format!("Status: {}", status))?;
                        if let Some(body) = self.body.as_ref() {
                            write_line(&mut output, &format!("Body: {}", render_body(body)))?;
                        }
                    }
                    (None, Some(error)) => {
                        write_line(&mut output, &format!("Error: {}", error))?;
                    }
                    (None, None) => {}
                }
                write_line(&mut output, ENTRY_SEPARATOR)?;
            }
        }

        Ok(output)
    }
}

fn write_line(output: &mut String, line: &str) -> Result<(), SinkError> {
    writeln!(output, "{}", line).map_err(|err| SinkError::FormatEntry { source: err })
}

fn render_body(body: &Value) -> String {
    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
}
