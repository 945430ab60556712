//! Error types for run configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration problems. Any of these aborts run construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No provider key was configured.
    #[error("No provider class configured (set CONFORMANCE_PROVIDER_CLASS)")]
    MissingProviderClass,

    /// The provider key does not name a registered constructor.
    #[error("Unknown provider class: {0}")]
    UnknownProvider(String),

    /// The provider requires a credential that was not supplied.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// A certificate or key file could not be read.
    #[error("Failed to read {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The custom properties were not a JSON object of strings.
    #[error("Failed to understand custom properties JSON: {0}")]
    MalformedCustomProperties(#[from] serde_json::Error),

    /// The provider has no live connection.
    #[error("Provider connection unavailable: {0}")]
    ConnectionUnavailable(String),
}
