//! hostgather-core: Worker contract and canonical inventory schema
//!
//! Backend-independent pieces shared by all gatherer workers: the `Worker`
//! trait the host driver runs against, the normalized per-node record, and
//! the ephemeral secret-material handler.

pub mod error;
pub mod secrets;
pub mod types;
pub mod worker;

pub use error::ConfigError;
pub use secrets::{SecretError, SecretFile};
pub use types::{CapacityValue, InventoryRecord, UNKNOWN, normalize_arch};
pub use worker::{HostMap, Worker};
