use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::HarnessConfig;

/// Loads a configuration file from the provided path or default locations.
///
/// # Errors
///
/// Returns an error when the config file cannot be read, parsed, or fails
/// validation.
pub fn load_config(path: Option<&str>) -> AppResult<Option<HarnessConfig>> {
    if let Some(path) = path {
        let path = PathBuf::from(path);
        return Ok(Some(load_config_file(&path)?));
    }

    let toml_path = PathBuf::from("apiharness.toml");
    if toml_path.exists() {
        return Ok(Some(load_config_file(&toml_path)?));
    }

    let json_path = PathBuf::from("apiharness.json");
    if json_path.exists() {
        return Ok(Some(load_config_file(&json_path)?));
    }

    Ok(None)
}

/// Loads and validates one config file, dispatching on extension.
///
/// # Errors
///
/// Returns an error when the file cannot be read, parsed, or fails
/// validation.
pub fn load_config_file(path: &Path) -> AppResult<HarnessConfig> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    let config: HarnessConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        })?,
        Some(ext) => {
            return Err(AppError::config(ConfigError::UnsupportedExtension {
                ext: ext.to_owned(),
            }));
        }
        None => return Err(AppError::config(ConfigError::MissingExtension)),
    };
    config.validate().map_err(AppError::config)?;
    Ok(config)
}
