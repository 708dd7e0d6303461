use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::config::HarnessConfig;
use crate::error::{AppError, AppResult, HttpError};
use crate::logging::{LogEntry, RequestLogger};

use super::retry::{RetryPolicy, Verdict};
use super::types::{AuthSpec, RequestOutcome, RequestSpec};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retrying request executor.
///
/// Stateless aside from configuration; cheap to clone and share across
/// concurrent test tasks. One logger instance may be shared by many clients.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    default_auth: AuthSpec,
    logger: Option<Arc<RequestLogger>>,
}

impl Client {
    /// Builds a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or the underlying HTTP
    /// client cannot be constructed.
    pub fn new(base_url: &str) -> AppResult<Self> {
        Self::build(base_url, DEFAULT_CONNECT_TIMEOUT, AuthSpec::None)
    }

    /// Builds a client from a validated [`HarnessConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or the underlying HTTP
    /// client cannot be constructed.
    pub fn from_config(config: &HarnessConfig) -> AppResult<Self> {
        Self::build(
            &config.base_url,
            config.connect_timeout(),
            config.auth_spec(),
        )
    }

    fn build(base_url: &str, connect_timeout: Duration, default_auth: AuthSpec) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|err| {
            AppError::http(HttpError::InvalidBaseUrl {
                url: base_url.to_owned(),
                source: err,
            })
        })?;
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))?;
        Ok(Self {
            http,
            base_url,
            default_auth,
            logger: None,
        })
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Executes one logical request under the spec's retry policy.
    ///
    /// Transport failures are absorbed into the returned outcome; the only
    /// `Err` paths are caller bugs (invalid spec, unjoinable endpoint,
    /// malformed header names/values) surfaced before the first attempt.
    ///
    /// # Errors
    ///
    /// Returns an error when the spec fails validation or cannot be turned
    /// into a well-formed request.
    pub async fn execute(&self, spec: &RequestSpec) -> AppResult<RequestOutcome> {
        spec.validate().map_err(AppError::validation)?;

        let url = self.build_url(spec)?;
        let headers = self.build_headers(spec);
        let header_map = to_header_map(&headers)?;
        let policy = RetryPolicy::new(spec.retry.clone());
        let max_attempts = spec.retry.max_attempts();

        let run_start = Instant::now();
        let mut attempt: u32 = 1;

        loop {
            self.log_request(spec, &url, &headers);
            let attempt_start = Instant::now();
            let outcome = self
                .perform_attempt(spec, &url, header_map.clone(), attempt_start, &policy)
                .await;

            match outcome {
                AttemptOutcome::Completed {
                    status,
                    body,
                    body_parse_error,
                } => {
                    if policy.classify_status(status) == Verdict::Retryable
                        && policy.allows_retry(attempt)
                    {
                        debug!(
                            "Attempt {} returned retryable status {}; backing off.",
                            attempt, status
                        );
                        sleep(policy.backoff_delay(attempt)).await;
                        attempt = attempt.saturating_add(1);
                        continue;
                    }
                    return Ok(RequestOutcome {
                        endpoint: spec.endpoint.clone(),
                        method: spec.method,
                        status: Some(status),
                        execution_time: run_start.elapsed(),
                        attempts: attempt,
                        body,
                        body_parse_error,
                        error: None,
                    });
                }
                AttemptOutcome::TransportError { verdict, message } => {
                    if verdict == Verdict::Retryable && policy.allows_retry(attempt) {
                        debug!(
                            "Attempt {} failed ({}); backing off.",
                            attempt, message
                        );
                        sleep(policy.backoff_delay(attempt)).await;
                        attempt = attempt.saturating_add(1);
                        continue;
                    }
                    return Ok(RequestOutcome {
                        endpoint: spec.endpoint.clone(),
                        method: spec.method,
                        status: None,
                        execution_time: run_start.elapsed(),
                        attempts: attempt,
                        body: None,
                        body_parse_error: None,
                        error: Some(message),
                    });
                }
            }
        }
    }

    async fn perform_attempt(
        &self,
        spec: &RequestSpec,
        url: &Url,
        headers: HeaderMap,
        attempt_start: Instant,
        policy: &RetryPolicy,
    ) -> AttemptOutcome {
        let mut request = self
            .http
            .request(spec.method.into(), url.clone())
            .headers(headers)
            .timeout(spec.timeout);
        if let Some(body) = spec.body.as_ref() {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return self.transport_failure(spec, url, attempt_start, policy, &err),
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => return self.transport_failure(spec, url, attempt_start, policy, &err),
        };
        let elapsed_ms = elapsed_ms(attempt_start);

        let (body, body_parse_error) = if text.is_empty() {
            (None, None)
        } else {
            match serde_json::from_str(&text) {
                Ok(value) => (Some(value), None),
                Err(err) => (None, Some(err.to_string())),
            }
        };

        if let Some(logger) = self.logger.as_ref() {
            logger.log_response(LogEntry::response(
                spec.method,
                url.to_string(),
                status,
                elapsed_ms,
                body.clone(),
            ));
        }

        AttemptOutcome::Completed {
            status,
            body,
            body_parse_error,
        }
    }

    fn transport_failure(
        &self,
        spec: &RequestSpec,
        url: &Url,
        attempt_start: Instant,
        policy: &RetryPolicy,
        error: &reqwest::Error,
    ) -> AttemptOutcome {
        let message = error.to_string();
        if let Some(logger) = self.logger.as_ref() {
            logger.log_response(LogEntry::transport_error(
                spec.method,
                url.to_string(),
                elapsed_ms(attempt_start),
                message.clone(),
            ));
        }
        AttemptOutcome::TransportError {
            verdict: policy.classify_transport(error),
            message,
        }
    }

    fn log_request(&self, spec: &RequestSpec, url: &Url, headers: &BTreeMap<String, String>) {
        if let Some(logger) = self.logger.as_ref() {
            logger.log_request(LogEntry::request(
                spec.method,
                url.to_string(),
                headers.clone(),
                spec.body.clone(),
            ));
        }
    }

    fn build_url(&self, spec: &RequestSpec) -> AppResult<Url> {
        let mut url = self.base_url.join(&spec.endpoint).map_err(|err| {
            AppError::http(HttpError::JoinUrlFailed {
                endpoint: spec.endpoint.clone(),
                source: err,
            })
        })?;
        if !spec.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &spec.query {
                pairs.append_pair(name, value);
            }
            drop(pairs);
        }
        Ok(url)
    }

    /// Merges spec headers with the injected `Authorization` header. The
    /// spec's own auth wins over the client-level default.
    fn build_headers(&self, spec: &RequestSpec) -> BTreeMap<String, String> {
        let mut headers = spec.headers.clone();
        let auth = if spec.auth == AuthSpec::None {
            &self.default_auth
        } else {
            &spec.auth
        };
        if let Some(value) = auth.header_value() {
            headers.insert("Authorization".to_owned(), value);
        }
        headers
    }
}

enum AttemptOutcome {
    Completed {
        status: u16,
        body: Option<serde_json::Value>,
        body_parse_error: Option<String>,
    },
    TransportError {
        verdict: Verdict,
        message: String,
    },
}

fn to_header_map(headers: &BTreeMap<String, String>) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderName {
                name: name.clone(),
                source: err,
            })
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderValue {
                name: name.clone(),
                source: err,
            })
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
