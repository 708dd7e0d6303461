use std::time::Duration;

use super::types::{Backoff, RetryConfig};

/// Classification of one finished attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The request completed; whether the test passes is an assertion
    /// concern, not a transport one.
    Complete,
    /// Worth another attempt if the budget allows.
    Retryable,
    /// Non-recoverable transport error; stop immediately.
    Fatal,
}

/// Decides whether and when a failed attempt is re-tried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn classify_status(&self, status: u16) -> Verdict {
        if self.config.retryable_status.contains(&status) {
            Verdict::Retryable
        } else {
            Verdict::Complete
        }
    }

    /// Timeouts and connection-level failures are worth re-trying; anything
    /// else (request construction, body decode) is terminal.
    #[must_use]
    pub fn classify_transport(&self, error: &reqwest::Error) -> Verdict {
        if error.is_timeout() || error.is_connect() {
            Verdict::Retryable
        } else {
            Verdict::Fatal
        }
    }

    /// Whether a retryable outcome on `attempt` (1-based) may be re-tried.
    #[must_use]
    pub const fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.config.max_attempts()
    }

    /// Wait before the attempt following `attempt` (1-based).
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff {
            Backoff::Fixed => self.config.base_interval,
            Backoff::Exponential => {
                let factor = 1u32
                    .checked_shl(attempt.saturating_sub(1))
                    .unwrap_or(u32::MAX);
                self.config.base_interval.saturating_mul(factor)
            }
        };
        match self.config.max_interval {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}
