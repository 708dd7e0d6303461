//! Environment configuration: typed file loading with fail-fast validation.
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{load_config, load_config_file};
pub use types::{AuthConfig, HarnessConfig};
