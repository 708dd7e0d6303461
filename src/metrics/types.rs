use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// Request completed and the caller's assertions passed.
    Success,
    /// Request completed but an assertion failed.
    Failed,
    /// The request itself failed at the transport level.
    Error,
}

/// One test outcome, appended exactly once per `record` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub test_name: String,
    pub test_class: String,
    pub status: TestStatus,
    /// Wall-clock execution time in seconds.
    pub execution_time: f64,
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Consistent point-in-time view over everything recorded so far.
///
/// Derived on demand; `passed + failed + error == total` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub error_tests: u64,
    /// `passed / total * 100`, or 0.0 when nothing was recorded.
    pub success_rate: f64,
    /// Sum of all recorded execution times, seconds.
    pub total_execution_time: f64,
    /// Mean execution time per `"METHOD endpoint"` bucket, seconds.
    pub average_response_times: BTreeMap<String, f64>,
    pub status_code_distribution: BTreeMap<u16, u64>,
}
