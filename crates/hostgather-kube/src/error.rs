//! Error types for hostgather-kube

use thiserror::Error;

use hostgather_core::SecretError;

/// Errors that can occur during one gather cycle.
///
/// These never cross the worker boundary: `run()` converts every variant to
/// a `None` result plus a log entry.
#[derive(Error, Debug)]
pub enum GatherError {
    /// Backend reachable but the API endpoint does not exist
    #[error("API endpoint not found (404)")]
    NotFound,

    /// HTTP request failed (connect, TLS, timeout, malformed response)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body from the server
        message: String,
    },

    /// Invalid endpoint URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Kubeconfig could not be read or the named entry does not exist
    #[error("kubeconfig error: {0}")]
    Kubeconfig(String),

    /// Kubeconfig YAML failed to parse
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Credential material could not be written to disk
    #[error("credential error: {0}")]
    Secret(#[from] SecretError),

    /// I/O error reading credential files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
