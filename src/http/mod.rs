//! Request specification, retry policy, and the retrying executor.
mod executor;
mod retry;
mod types;

#[cfg(test)]
mod tests;

pub use executor::Client;
pub use retry::{RetryPolicy, Verdict};
pub use types::{AuthSpec, Backoff, Method, RequestOutcome, RequestSpec, RetryConfig};
