//! Canonical inventory types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder for values a backend cannot supply.
pub const UNKNOWN: &str = "(unknown)";

/// A backend-reported capacity value.
///
/// Backends report capacities as undifferentiated scalars: a plain count
/// (`"4"`), a unit-suffixed quantity (`"500m"`), or nothing at all. The
/// variants keep that distinction explicit instead of inferring a numeric
/// type from context. Serializes untagged: number, string, or null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapacityValue {
    /// Plain unsigned count
    Number(u64),
    /// Quantity the backend reports in its own notation
    Text(String),
    /// Backend did not report the capacity
    Unknown,
}

impl CapacityValue {
    /// Parse a raw capacity string, `None` meaning the backend omitted it.
    #[must_use]
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) => match s.parse::<u64>() {
                Ok(n) => CapacityValue::Number(n),
                Err(_) => CapacityValue::Text(s.to_string()),
            },
            None => CapacityValue::Unknown,
        }
    }
}

/// Normalize a backend architecture string to the canonical name.
///
/// `"amd64"` in any casing becomes `"x86_64"`; everything else passes
/// through verbatim.
#[must_use]
pub fn normalize_arch(arch: &str) -> String {
    if arch.eq_ignore_ascii_case("amd64") {
        "x86_64".to_string()
    } else {
        arch.to_string()
    }
}

/// Normalized per-node inventory record.
///
/// The schema shared by every worker implementation; field names serialize
/// to the wire names the host driver expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Backend identifier, e.g. "kubernetes"
    #[serde(rename = "type")]
    pub backend_type: String,
    /// Normalized architecture name
    pub cpu_arch: String,
    /// CPU model description
    pub cpu_description: String,
    /// Raw CPU capacity as reported by the backend
    pub cpu_mhz: CapacityValue,
    /// CPU vendor
    pub cpu_vendor: String,
    /// Stable machine identifier
    pub host_identifier: String,
    /// Node name, also the output-mapping key
    pub name: String,
    /// Backend-reported OS image string
    pub os: String,
    /// OS version, placeholder when the backend has no structured version
    pub os_version: CapacityValue,
    /// Memory in megabytes
    pub ram_mb: u64,
    /// Raw CPU capacity, same value as `cpu_mhz`
    pub total_cpu_cores: CapacityValue,
    /// Raw CPU capacity, same value as `cpu_mhz`
    pub total_cpu_sockets: CapacityValue,
    /// Thread count, constant 1 for backends without a thread breakdown
    pub total_cpu_threads: u64,
    /// Guests hosted on this node; empty for leaf compute resources
    pub vms: BTreeMap<String, String>,
}
