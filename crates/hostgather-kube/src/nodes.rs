//! Node listing and normalization

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use hostgather_core::{CapacityValue, InventoryRecord, UNKNOWN, normalize_arch};

use crate::error::GatherError;
use crate::session::Session;

/// Backend identifier carried in every record.
pub const BACKEND_TYPE: &str = "kubernetes";

/// `GET /api/v1/nodes` response.
#[derive(Debug, Deserialize)]
pub struct NodeList {
    #[serde(default)]
    pub items: Vec<Node>,
}

#[derive(Debug, Deserialize)]
pub struct Node {
    pub metadata: Metadata,
    pub status: NodeStatus,
}

#[derive(Debug, Deserialize)]
pub struct Metadata {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NodeStatus {
    /// Capacity scalars keyed by resource name (`cpu`, `memory`, ...)
    #[serde(default)]
    pub capacity: BTreeMap<String, String>,
    #[serde(rename = "nodeInfo")]
    pub node_info: NodeInfo,
}

#[derive(Debug, Deserialize)]
pub struct NodeInfo {
    pub architecture: String,
    #[serde(rename = "machineID")]
    pub machine_id: String,
    #[serde(rename = "osImage")]
    pub os_image: String,
}

/// List the cluster's nodes.
///
/// # Errors
/// Returns `GatherError::NotFound` on a 404, `GatherError::Api` on any other
/// non-success status, and `GatherError::Http` on transport failure.
pub async fn list_nodes(
    client: &reqwest::Client,
    session: &Session,
) -> Result<NodeList, GatherError> {
    let url = session.url("/api/v1/nodes")?;
    debug!(%url, "listing cluster nodes");

    let response = session.authorize(client.get(url)).send().await?;
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(GatherError::NotFound);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(GatherError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

static MEMORY_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)(\w+)$").unwrap());

/// Convert a node memory capacity string to megabytes.
///
/// Only the `Ki` and `Gi` suffixes the node API actually reports are
/// converted; a string that does not match `magnitude+unit` or carries any
/// other unit yields 0 rather than a magnitude in the wrong unit.
#[must_use]
pub fn parse_memory_mb(raw: &str) -> u64 {
    let Some(caps) = MEMORY_PATTERN.captures(raw) else {
        return 0;
    };
    let Ok(magnitude) = caps[1].parse::<u64>() else {
        return 0;
    };
    match &caps[2] {
        "Ki" => magnitude / 1024,
        "Gi" => magnitude.saturating_mul(1024),
        _ => 0,
    }
}

/// Map one backend node onto the canonical inventory record.
///
/// The node API exposes a single undifferentiated CPU capacity; it feeds the
/// frequency, core and socket fields identically.
#[must_use]
pub fn normalize(node: &Node) -> InventoryRecord {
    let cpu = CapacityValue::from_raw(node.status.capacity.get("cpu").map(String::as_str));
    let ram_mb = node
        .status
        .capacity
        .get("memory")
        .map_or(0, |memory| parse_memory_mb(memory));
    let info = &node.status.node_info;

    InventoryRecord {
        backend_type: BACKEND_TYPE.to_string(),
        cpu_arch: normalize_arch(&info.architecture),
        cpu_description: UNKNOWN.to_string(),
        cpu_mhz: cpu.clone(),
        cpu_vendor: UNKNOWN.to_string(),
        host_identifier: info.machine_id.clone(),
        name: node.metadata.name.clone(),
        os: info.os_image.clone(),
        os_version: CapacityValue::Number(1),
        ram_mb,
        total_cpu_cores: cpu.clone(),
        total_cpu_sockets: cpu,
        total_cpu_threads: 1,
        vms: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_ki() {
        assert_eq!(parse_memory_mb("4194304Ki"), 4096);
        assert_eq!(parse_memory_mb("1023Ki"), 0); // truncating division
    }

    #[test]
    fn test_parse_memory_gi() {
        assert_eq!(parse_memory_mb("4Gi"), 4096);
    }

    #[test]
    fn test_parse_memory_unrecognized_unit() {
        assert_eq!(parse_memory_mb("500Mi"), 0);
        assert_eq!(parse_memory_mb("2Ti"), 0);
    }

    #[test]
    fn test_parse_memory_no_match() {
        assert_eq!(parse_memory_mb("unknown"), 0);
        assert_eq!(parse_memory_mb(""), 0);
        assert_eq!(parse_memory_mb("Ki4194304"), 0);
    }

    fn sample_node(name: &str, arch: &str) -> Node {
        serde_json::from_value(serde_json::json!({
            "metadata": { "name": name },
            "status": {
                "capacity": { "cpu": "4", "memory": "8388608Ki" },
                "nodeInfo": {
                    "architecture": arch,
                    "machineID": "f2c1a5b8d99e4f0c",
                    "osImage": "Ubuntu 24.04.1 LTS"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_node() {
        let record = normalize(&sample_node("worker-0", "amd64"));

        assert_eq!(record.backend_type, "kubernetes");
        assert_eq!(record.name, "worker-0");
        assert_eq!(record.cpu_arch, "x86_64");
        assert_eq!(record.cpu_description, "(unknown)");
        assert_eq!(record.cpu_vendor, "(unknown)");
        assert_eq!(record.cpu_mhz, CapacityValue::Number(4));
        assert_eq!(record.total_cpu_cores, CapacityValue::Number(4));
        assert_eq!(record.total_cpu_sockets, CapacityValue::Number(4));
        assert_eq!(record.total_cpu_threads, 1);
        assert_eq!(record.ram_mb, 8192);
        assert_eq!(record.host_identifier, "f2c1a5b8d99e4f0c");
        assert_eq!(record.os, "Ubuntu 24.04.1 LTS");
        assert_eq!(record.os_version, CapacityValue::Number(1));
        assert!(record.vms.is_empty());
    }

    #[test]
    fn test_normalize_arch_passthrough() {
        let record = normalize(&sample_node("worker-1", "arm64"));
        assert_eq!(record.cpu_arch, "arm64");
    }

    #[test]
    fn test_normalize_missing_capacity() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "bare" },
            "status": {
                "nodeInfo": {
                    "architecture": "arm64",
                    "machineID": "0",
                    "osImage": "Talos"
                }
            }
        }))
        .unwrap();

        let record = normalize(&node);
        assert_eq!(record.cpu_mhz, CapacityValue::Unknown);
        assert_eq!(record.ram_mb, 0);
    }

    #[test]
    fn test_fractional_cpu_capacity_kept_verbatim() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "small" },
            "status": {
                "capacity": { "cpu": "500m", "memory": "1Gi" },
                "nodeInfo": {
                    "architecture": "arm64",
                    "machineID": "1",
                    "osImage": "k3os"
                }
            }
        }))
        .unwrap();

        let record = normalize(&node);
        assert_eq!(record.cpu_mhz, CapacityValue::Text("500m".to_string()));
        assert_eq!(record.ram_mb, 1024);
    }
}
