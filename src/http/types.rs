use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRYABLE_STATUS: &[u16] = &[429, 502, 503, 504];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthSpec {
    #[default]
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
}

impl AuthSpec {
    /// The `Authorization` header value this auth produces, if any.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        match self {
            AuthSpec::None => None,
            AuthSpec::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{}:{}", username, password));
                Some(format!("Basic {}", encoded))
            }
            AuthSpec::Bearer { token } => Some(format!("Bearer {}", token)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed,
    Exponential,
}

/// Retry/backoff settings for one logical request.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub backoff: Backoff,
    pub base_interval: Duration,
    pub max_interval: Option<Duration>,
    pub retryable_status: BTreeSet<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::Fixed,
            base_interval: DEFAULT_RETRY_INTERVAL,
            max_interval: None,
            retryable_status: DEFAULT_RETRYABLE_STATUS.iter().copied().collect(),
        }
    }
}

impl RetryConfig {
    /// Total physical attempts this config permits: `max(1, max_retries)`.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        if self.max_retries == 0 {
            1
        } else {
            self.max_retries
        }
    }
}

/// Everything the executor needs for one logical request.
///
/// Endpoint placeholders (`{param}`) are resolved by the caller before the
/// spec reaches the executor. Immutable once constructed; the executor never
/// mutates it.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub auth: AuthSpec,
    pub timeout: Duration,
    pub retry: RetryConfig,
}

impl RequestSpec {
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            body: None,
            auth: AuthSpec::None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthSpec) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Checks the spec for caller bugs before any network activity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a zero timeout, an empty endpoint,
    /// or a zero backoff base with retries enabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout.is_zero() {
            return Err(ValidationError::ZeroTimeout);
        }
        if self.endpoint.trim().is_empty() {
            return Err(ValidationError::EmptyEndpoint);
        }
        if self.retry.max_retries > 1 && self.retry.base_interval.is_zero() {
            return Err(ValidationError::ZeroBackoffBase);
        }
        Ok(())
    }
}

/// Terminal record of one `execute` call.
///
/// Transport failures land in `error` instead of an `Err` return so the
/// harness can assert on outcomes uniformly; a response body that is not
/// valid JSON is noted in `body_parse_error` without failing the request.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub endpoint: String,
    pub method: Method,
    pub status: Option<u16>,
    pub execution_time: Duration,
    pub attempts: u32,
    pub body: Option<Value>,
    pub body_parse_error: Option<String>,
    pub error: Option<String>,
}

impl RequestOutcome {
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        self.error.is_some()
    }
}
