use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported config extension '{ext}'. Expected toml or json.")]
    UnsupportedExtension { ext: String },
    #[error("Config path has no extension. Expected toml or json.")]
    MissingExtension,
    #[error("base_url must not be empty.")]
    BaseUrlEmpty,
    #[error("Invalid base_url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("timeout must be > 0.")]
    ZeroTimeout,
    #[error("Unknown auth type '{kind}'. Expected basic or bearer.")]
    UnknownAuthType { kind: String },
    #[error("Basic auth requires username and password.")]
    IncompleteBasicAuth,
    #[error("Bearer auth requires a token.")]
    MissingBearerToken,
}
