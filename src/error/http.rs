use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to join endpoint '{endpoint}' onto base URL: {source}")]
    JoinUrlFailed {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header name '{name}': {source}")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: reqwest::header::InvalidHeaderName,
    },
    #[error("Invalid header value for '{name}': {source}")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}
