use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::http::{AuthSpec, Backoff, RetryConfig};

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

const fn default_retry_attempts() -> u32 {
    3
}

const fn default_retry_delay_secs() -> u64 {
    1
}

fn default_log_file() -> String {
    "api_logs.txt".to_owned()
}

/// Validated harness configuration, typically one file per environment.
///
/// Recognized options are enumerated here rather than interpreted ad hoc;
/// anything else in the file is a deserialization error.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default)]
    pub exponential_backoff: bool,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Extra sensitive key names masked by the log redactor, on top of the
    /// built-in set.
    #[serde(default)]
    pub sensitive_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl HarnessConfig {
    /// Fails fast on any option that would only blow up mid-session.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or unparsable base URL, a zero timeout,
    /// an unknown auth type, or incomplete auth credentials.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::BaseUrlEmpty);
        }
        if let Err(err) = Url::parse(&self.base_url) {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                source: err,
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if let Some(auth) = self.auth.as_ref() {
            match auth.kind.as_str() {
                "basic" => {
                    if auth.username.is_none() || auth.password.is_none() {
                        return Err(ConfigError::IncompleteBasicAuth);
                    }
                }
                "bearer" => {
                    if auth.token.is_none() {
                        return Err(ConfigError::MissingBearerToken);
                    }
                }
                other => {
                    return Err(ConfigError::UnknownAuthType {
                        kind: other.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Retry settings shaped for [`crate::http::RequestSpec::with_retry`].
    #[must_use]
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.retry_attempts,
            backoff: if self.exponential_backoff {
                Backoff::Exponential
            } else {
                Backoff::Fixed
            },
            base_interval: Duration::from_secs(self.retry_delay_secs),
            ..RetryConfig::default()
        }
    }

    /// Session-level auth, applied to specs that carry no auth of their own.
    /// Assumes `validate()` has passed; anything malformed degrades to none.
    #[must_use]
    pub fn auth_spec(&self) -> AuthSpec {
        let Some(auth) = self.auth.as_ref() else {
            return AuthSpec::None;
        };
        match auth.kind.as_str() {
            "basic" => match (auth.username.as_ref(), auth.password.as_ref()) {
                (Some(username), Some(password)) => AuthSpec::Basic {
                    username: username.clone(),
                    password: password.clone(),
                },
                _ => AuthSpec::None,
            },
            "bearer" => auth.token.as_ref().map_or(AuthSpec::None, |token| {
                AuthSpec::Bearer {
                    token: token.clone(),
                }
            }),
            _ => AuthSpec::None,
        }
    }
}
