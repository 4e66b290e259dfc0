//! Worker trait

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;

use crate::error::ConfigError;
use crate::types::InventoryRecord;

/// Gather result: one record per node, keyed by node name.
pub type HostMap = BTreeMap<String, InventoryRecord>;

/// A pluggable inventory backend.
///
/// The host driver constructs a worker, inspects `parameters()` for
/// validation and help output, feeds it a configuration mapping via
/// `set_config()`, and invokes `run()` for one full gather cycle. Workers
/// reporting `is_usable() == false` are skipped.
#[async_trait]
pub trait Worker: Send + Sync {
    /// Recognized configuration keys and their defaults, in display order:
    /// connection target first, then credentials, then advanced options.
    fn parameters(&self) -> &'static [(&'static str, &'static str)];

    /// Validate and store the configuration for the next run.
    ///
    /// # Errors
    /// Returns `ConfigError` when the required-parameter invariant is
    /// violated. Runs before any network or filesystem activity.
    fn set_config(&mut self, config: &HashMap<String, String>) -> Result<(), ConfigError>;

    /// Perform one gather cycle: setup, query, normalize, teardown.
    ///
    /// Returns `None` when the backend is unreachable or misconfigured so
    /// the host can treat it as empty input and continue with other
    /// workers. Any temporary credential files created during the call are
    /// removed before returning, on every exit path.
    async fn run(&mut self) -> Option<HostMap>;

    /// Whether the worker's backend dependency is available.
    fn is_usable(&self) -> bool;
}
