//! Concurrent aggregation of per-test outcomes.
mod aggregator;
mod types;


pub use aggregator::MetricsAggregator;
pub use types::{MetricsSnapshot, TestRecord, TestStatus};
