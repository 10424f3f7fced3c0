//! Provisioned instance model

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A provisioned compute instance belonging to one infrastructure.
///
/// Equality and hashing use `id` and `tag` only. Everything else is
/// descriptive state the backend may change between refreshes (status most of
/// all), and two records for the same node must collapse to one set member no
/// matter how stale one of them is. Records are replaced whole, never patched
/// field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Backend-assigned instance identifier
    pub id: String,

    /// Caller-assigned grouping tag
    pub tag: String,

    /// Boot image name or id
    pub image: String,

    /// Vendor sizing token, passed through opaquely
    pub instance_count: String,

    pub ram: String,

    pub cpu: String,

    /// Provider-reported status string, uninterpreted by the core
    pub status: String,

    /// Script batch to run after boot, if any
    pub post_boot_script: Option<InstanceScript>,
}

impl Instance {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
            image: String::new(),
            instance_count: String::new(),
            ram: String::new(),
            cpu: String::new(),
            status: String::new(),
            post_boot_script: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

// id + tag only; descriptive fields must not affect set membership
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tag == other.tag
    }
}

impl Eq for Instance {}

impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.tag.hash(state);
    }
}

/// An ordered batch of script payloads addressed to one instance.
///
/// Order is execution order and is preserved end to end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceScript {
    /// Target instance id
    pub instance_id: String,

    /// Script bodies, executed front to back
    pub scripts: Vec<String>,
}

impl InstanceScript {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            scripts: Vec::new(),
        }
    }

    pub fn with_script(mut self, body: impl Into<String>) -> Self {
        self.scripts.push(body.into());
        self
    }
}

/// Outcome of running an [`InstanceScript`].
///
/// `output` holds whatever the backend captured; a non-empty `error` signals
/// partial or total failure. Neither field is parsed by the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptResult {
    pub output: String,
    pub error: String,
}

impl ScriptResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: String::new(),
        }
    }

    pub fn failed(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: error.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.error.is_empty()
    }
}
