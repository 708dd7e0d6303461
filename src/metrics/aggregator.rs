use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::http::RequestOutcome;

use super::types::{MetricsSnapshot, TestRecord, TestStatus};

#[derive(Debug, Default)]
struct AggregatorState {
    records: Vec<TestRecord>,
    passed_tests: u64,
    failed_tests: u64,
    error_tests: u64,
    total_execution_time: f64,
    // sum + count per "METHOD endpoint" bucket; means derive at snapshot time.
    response_times: BTreeMap<String, (f64, u64)>,
    status_codes: BTreeMap<u16, u64>,
}

/// Process-wide accumulator of test outcomes.
///
/// `record` is safe under concurrent invocation; all counter groups for one
/// outcome update inside a single mutual-exclusion region, so no interleaving
/// can lose an update or split a record across snapshots. The record store is
/// append-only for the lifetime of a reporting session.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    state: Mutex<AggregatorState>,
}

impl MetricsAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends exactly one [`TestRecord`] for the outcome.
    ///
    /// The SUCCESS/FAILED classification comes from the caller's assertion
    /// layer; an outcome carrying a transport error is recorded as ERROR
    /// regardless of what the caller supplied.
    pub fn record(
        &self,
        outcome: &RequestOutcome,
        status: TestStatus,
        test_name: &str,
        test_class: &str,
    ) {
        let status = if outcome.is_transport_failure() {
            TestStatus::Error
        } else {
            status
        };
        let record = TestRecord {
            test_name: test_name.to_owned(),
            test_class: test_class.to_owned(),
            status,
            execution_time: outcome.execution_time.as_secs_f64(),
            timestamp: Utc::now(),
            endpoint: outcome.endpoint.clone(),
            method: outcome.method,
            response_code: outcome.status,
            error_message: outcome.error.clone(),
        };

        let mut state = self.lock();
        match status {
            TestStatus::Success => state.passed_tests = state.passed_tests.saturating_add(1),
            TestStatus::Failed => state.failed_tests = state.failed_tests.saturating_add(1),
            TestStatus::Error => state.error_tests = state.error_tests.saturating_add(1),
        }
        state.total_execution_time += record.execution_time;

        let bucket = format!("{} {}", record.method, record.endpoint);
        let entry = state.response_times.entry(bucket).or_insert((0.0, 0));
        entry.0 += record.execution_time;
        entry.1 = entry.1.saturating_add(1);

        if let Some(code) = record.response_code {
            let counter = state.status_codes.entry(code).or_insert(0);
            *counter = counter.saturating_add(1);
        }

        state.records.push(record);
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.lock();
        let total_tests = state
            .passed_tests
            .saturating_add(state.failed_tests)
            .saturating_add(state.error_tests);
        let success_rate = if total_tests > 0 {
            state.passed_tests as f64 / total_tests as f64 * 100.0
        } else {
            0.0
        };
        let average_response_times = state
            .response_times
            .iter()
            .map(|(bucket, &(sum, count))| {
                let mean = if count > 0 { sum / count as f64 } else { 0.0 };
                (bucket.clone(), mean)
            })
            .collect();

        MetricsSnapshot {
            total_tests,
            passed_tests: state.passed_tests,
            failed_tests: state.failed_tests,
            error_tests: state.error_tests,
            success_rate,
            total_execution_time: state.total_execution_time,
            average_response_times,
            status_code_distribution: state.status_codes.clone(),
        }
    }

    /// Clones the append-only record list.
    #[must_use]
    pub fn records(&self) -> Vec<TestRecord> {
        self.lock().records.clone()
    }

    fn lock(&self) -> MutexGuard<'_, AggregatorState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
