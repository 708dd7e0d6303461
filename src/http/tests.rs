use std::time::Duration;

use super::retry::{RetryPolicy, Verdict};
use super::types::{AuthSpec, Backoff, Method, RequestSpec, RetryConfig};
use crate::error::ValidationError;

fn retry_config(max_retries: u32, backoff: Backoff, base_ms: u64) -> RetryConfig {
    RetryConfig {
        max_retries,
        backoff,
        base_interval: Duration::from_millis(base_ms),
        ..RetryConfig::default()
    }
}

#[test]
fn default_retryable_statuses_classify_as_retryable() -> Result<(), String> {
    let policy = RetryPolicy::new(RetryConfig::default());
    for status in [429u16, 502, 503, 504] {
        if policy.classify_status(status) != Verdict::Retryable {
            return Err(format!("Expected {} to be retryable", status));
        }
    }
    // Completed requests, even failing ones, are not transport concerns.
    for status in [200u16, 201, 404, 500] {
        if policy.classify_status(status) != Verdict::Complete {
            return Err(format!("Expected {} to be complete", status));
        }
    }
    Ok(())
}

#[test]
fn custom_retryable_status_set_is_honored() -> Result<(), String> {
    let mut config = RetryConfig::default();
    config.retryable_status = [500u16].into_iter().collect();
    let policy = RetryPolicy::new(config);
    if policy.classify_status(500) != Verdict::Retryable {
        return Err("Expected 500 to be retryable".to_owned());
    }
    if policy.classify_status(503) != Verdict::Complete {
        return Err("Expected 503 to be complete with custom set".to_owned());
    }
    Ok(())
}

#[test]
fn fixed_backoff_is_constant() -> Result<(), String> {
    let policy = RetryPolicy::new(retry_config(5, Backoff::Fixed, 250));
    for attempt in 1u32..=4 {
        if policy.backoff_delay(attempt) != Duration::from_millis(250) {
            return Err(format!("Unexpected delay for attempt {}", attempt));
        }
    }
    Ok(())
}

#[test]
fn exponential_backoff_doubles_per_attempt() -> Result<(), String> {
    let policy = RetryPolicy::new(retry_config(5, Backoff::Exponential, 100));
    let expected = [(1u32, 100u64), (2, 200), (3, 400), (4, 800)];
    for (attempt, millis) in expected {
        if policy.backoff_delay(attempt) != Duration::from_millis(millis) {
            return Err(format!("Unexpected delay for attempt {}", attempt));
        }
    }
    Ok(())
}

#[test]
fn exponential_backoff_respects_cap() -> Result<(), String> {
    let mut config = retry_config(10, Backoff::Exponential, 100);
    config.max_interval = Some(Duration::from_millis(300));
    let policy = RetryPolicy::new(config);
    if policy.backoff_delay(1) != Duration::from_millis(100) {
        return Err("First delay should be below the cap".to_owned());
    }
    if policy.backoff_delay(4) != Duration::from_millis(300) {
        return Err("Delay should saturate at the cap".to_owned());
    }
    // Shift amounts past u32 width must not wrap.
    if policy.backoff_delay(40) != Duration::from_millis(300) {
        return Err("Huge attempt numbers should stay capped".to_owned());
    }
    Ok(())
}

#[test]
fn attempt_budget_follows_max_retries() -> Result<(), String> {
    let zero = RetryPolicy::new(retry_config(0, Backoff::Fixed, 100));
    if zero.allows_retry(1) {
        return Err("max_retries = 0 must allow exactly one attempt".to_owned());
    }

    let three = RetryPolicy::new(retry_config(3, Backoff::Fixed, 100));
    if !three.allows_retry(1) || !three.allows_retry(2) {
        return Err("Attempts below the budget must be retryable".to_owned());
    }
    if three.allows_retry(3) {
        return Err("Attempt 3 of 3 is terminal".to_owned());
    }
    Ok(())
}

#[test]
fn spec_validation_rejects_caller_bugs() -> Result<(), String> {
    let zero_timeout =
        RequestSpec::new(Method::Get, "/users").with_timeout(Duration::from_secs(0));
    match zero_timeout.validate() {
        Err(ValidationError::ZeroTimeout) => {}
        other => return Err(format!("Expected ZeroTimeout, got {:?}", other)),
    }

    let empty_endpoint = RequestSpec::new(Method::Get, "  ");
    match empty_endpoint.validate() {
        Err(ValidationError::EmptyEndpoint) => {}
        other => return Err(format!("Expected EmptyEndpoint, got {:?}", other)),
    }

    let zero_base =
        RequestSpec::new(Method::Get, "/users").with_retry(retry_config(3, Backoff::Fixed, 0));
    match zero_base.validate() {
        Err(ValidationError::ZeroBackoffBase) => {}
        other => return Err(format!("Expected ZeroBackoffBase, got {:?}", other)),
    }

    // A single-attempt spec never backs off, so a zero base is harmless.
    let single = RequestSpec::new(Method::Get, "/users")
        .with_retry(retry_config(0, Backoff::Fixed, 0));
    single.validate().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn auth_header_values() -> Result<(), String> {
    if AuthSpec::None.header_value().is_some() {
        return Err("No auth must leave headers untouched".to_owned());
    }

    let basic = AuthSpec::Basic {
        username: "alice".to_owned(),
        password: "s3cret".to_owned(),
    };
    // base64("alice:s3cret")
    if basic.header_value().as_deref() != Some("Basic YWxpY2U6czNjcmV0") {
        return Err(format!("Unexpected basic header: {:?}", basic.header_value()));
    }

    let bearer = AuthSpec::Bearer {
        token: "abc123".to_owned(),
    };
    if bearer.header_value().as_deref() != Some("Bearer abc123") {
        return Err(format!(
            "Unexpected bearer header: {:?}",
            bearer.header_value()
        ));
    }
    Ok(())
}

#[test]
fn method_displays_as_uppercase_verb() -> Result<(), String> {
    let expected = [
        (Method::Get, "GET"),
        (Method::Post, "POST"),
        (Method::Put, "PUT"),
        (Method::Patch, "PATCH"),
        (Method::Delete, "DELETE"),
    ];
    for (method, verb) in expected {
        if method.to_string() != verb {
            return Err(format!("Unexpected display for {:?}", method));
        }
    }
    Ok(())
}

#[test]
fn spec_builders_accumulate() -> Result<(), String> {
    let spec = RequestSpec::new(Method::Post, "/users")
        .with_header("Content-Type", "application/json")
        .with_query("page", "2")
        .with_body(serde_json::json!({ "name": "alice" }))
        .with_auth(AuthSpec::Bearer {
            token: "t".to_owned(),
        })
        .with_timeout(Duration::from_secs(5));

    if spec.headers.get("Content-Type").map(String::as_str) != Some("application/json") {
        return Err("Missing header".to_owned());
    }
    if spec.query.get("page").map(String::as_str) != Some("2") {
        return Err("Missing query param".to_owned());
    }
    if spec.body.is_none() {
        return Err("Missing body".to_owned());
    }
    if spec.timeout != Duration::from_secs(5) {
        return Err("Unexpected timeout".to_owned());
    }
    Ok(())
}
