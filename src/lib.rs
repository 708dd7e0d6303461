//! Core library for the `apiharness` test harness.
//!
//! This crate provides the building blocks an API test suite composes at
//! session start: a retrying HTTP request executor, a non-blocking
//! request/response logger with secret redaction, a concurrent metrics
//! aggregator, and JSON/CSV report exporters. Assertion logic and test
//! discovery live outside this crate; tests hand a [`http::RequestSpec`] to
//! [`http::Client::execute`], classify the returned outcome, and feed it to a
//! shared [`metrics::MetricsAggregator`].
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod sinks;

mod logger;

pub use logger::init_logging;
