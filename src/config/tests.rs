use std::time::Duration;

use tempfile::tempdir;

use super::load_config_file;
use crate::http::{AuthSpec, Backoff};

#[test]
fn parse_toml_config_with_auth() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("apiharness.toml");
    let content = r#"
base_url = "http://localhost:8000"
timeout_secs = 15
retry_attempts = 2
retry_delay_secs = 1
exponential_backoff = true
log_file = "logs/api.txt"

[auth]
type = "bearer"
token = "abc123"
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.base_url != "http://localhost:8000" {
        return Err(format!("Unexpected base_url: {}", config.base_url));
    }
    if config.timeout() != Duration::from_secs(15) {
        return Err("Unexpected timeout".to_owned());
    }
    let retry = config.retry_config();
    if retry.max_retries != 2 {
        return Err("Unexpected retry_attempts".to_owned());
    }
    if retry.backoff != Backoff::Exponential {
        return Err("Expected exponential backoff".to_owned());
    }
    match config.auth_spec() {
        AuthSpec::Bearer { token } if token == "abc123" => Ok(()),
        other => Err(format!("Unexpected auth: {:?}", other)),
    }
}

#[test]
fn parse_json_config_applies_defaults() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("apiharness.json");
    let content = r#"{ "base_url": "http://localhost:8000" }"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.timeout() != Duration::from_secs(30) {
        return Err("Expected default timeout of 30s".to_owned());
    }
    if config.retry_config().max_retries != 3 {
        return Err("Expected default retry_attempts of 3".to_owned());
    }
    if config.log_file != "api_logs.txt" {
        return Err(format!("Unexpected log_file: {}", config.log_file));
    }
    if config.auth_spec() != AuthSpec::None {
        return Err("Expected no auth by default".to_owned());
    }
    Ok(())
}

#[test]
fn unknown_auth_type_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("apiharness.toml");
    let content = r#"
base_url = "http://localhost:8000"

[auth]
type = "digest"
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    match load_config_file(&path) {
        Ok(_) => Err("Expected unknown auth type to be rejected".to_owned()),
        Err(_) => Ok(()),
    }
}

#[test]
fn incomplete_basic_auth_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("apiharness.toml");
    let content = r#"
base_url = "http://localhost:8000"

[auth]
type = "basic"
username = "alice"
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    match load_config_file(&path) {
        Ok(_) => Err("Expected incomplete basic auth to be rejected".to_owned()),
        Err(_) => Ok(()),
    }
}

#[test]
fn invalid_base_url_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("apiharness.toml");
    std::fs::write(&path, "base_url = \"not a url\"\n")
        .map_err(|err| format!("write failed: {}", err))?;

    match load_config_file(&path) {
        Ok(_) => Err("Expected invalid base_url to be rejected".to_owned()),
        Err(_) => Ok(()),
    }
}

#[test]
fn zero_timeout_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("apiharness.toml");
    let content = "base_url = \"http://localhost:8000\"\ntimeout_secs = 0\n";
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    match load_config_file(&path) {
        Ok(_) => Err("Expected zero timeout to be rejected".to_owned()),
        Err(_) => Ok(()),
    }
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("apiharness.yaml");
    std::fs::write(&path, "base_url: http://localhost\n")
        .map_err(|err| format!("write failed: {}", err))?;

    match load_config_file(&path) {
        Ok(_) => Err("Expected unsupported extension to be rejected".to_owned()),
        Err(_) => Ok(()),
    }
}
