//! Instance creation requests and provider read models

use crate::model::InstanceScript;
use serde::{Deserialize, Serialize};

/// Payload for provisioning instances on one infrastructure.
///
/// A single request may ask for N nodes; the provider answers with the full
/// set of records it created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceRequest {
    /// Grouping tag stamped onto every created instance
    pub tag: String,

    /// Boot image name or id
    pub image: String,

    /// Vendor sizing tokens, passed through opaquely
    pub instance_count: String,
    pub ram: String,
    pub cpu: String,

    /// Script batch to run once the nodes are up
    pub post_boot_script: Option<InstanceScript>,

    /// Optional vendor-specific overlay
    pub options: Option<Options>,
}

/// Optional overlay on an [`InstanceRequest`]; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    /// Maximum spot/preemptible price, in the vendor's currency unit
    pub spot_price: Option<f64>,

    /// Security group names to attach
    pub security_groups: Vec<String>,

    /// Subnet to place the nodes in
    pub subnet_id: Option<String>,

    /// Fixed MAC addresses, one per requested node
    pub mac_addresses: Vec<String>,
}

/// Boot image as reported by a provider query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
}

impl Image {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Hardware shape as reported by a provider query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hardware {
    pub cores: u32,
    pub ram_mb: u64,
    pub disk_gb: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_without_optionals() {
        let json = r#"{
            "tag": "web",
            "image": "ubuntu-24.04",
            "instance_count": "3",
            "ram": "4096",
            "cpu": "2"
        }"#;

        let request: InstanceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.instance_count, "3");
        assert!(request.post_boot_script.is_none());
        assert!(request.options.is_none());
    }
}
