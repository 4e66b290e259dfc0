//! Error types for hostgather-core

use thiserror::Error;

/// Errors raised while validating a worker configuration.
///
/// The only failure that crosses the worker boundary as an error value;
/// runtime failures during a gather cycle surface as a `None` result plus a
/// log entry instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither an explicit endpoint nor an external config file was given
    #[error("missing either parameter 'url' or the pair 'kubeconfig' and 'context'")]
    MissingConnectionTarget,
}
