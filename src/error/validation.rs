use thiserror::Error;

/// Rejections of a malformed [`crate::http::RequestSpec`].
///
/// These are caller bugs and surface synchronously at `execute` entry,
/// unlike transport failures which are absorbed into the outcome.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Request timeout must be > 0.")]
    ZeroTimeout,
    #[error("Endpoint must not be empty.")]
    EmptyEndpoint,
    #[error("Backoff base interval must be > 0 when retries are enabled.")]
    ZeroBackoffBase,
}
