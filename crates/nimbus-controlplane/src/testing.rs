//! Recording mock provider
//!
//! Backend stand-in for tests: answers canned data, records every call it
//! receives, and injects failures on demand. Enabled through the
//! `test-utils` feature so downstream crates can drive the control plane
//! without a real backend.

use async_trait::async_trait;
use nimbus_cloud::{InfrastructureProvider, ProviderError, Result};
use nimbus_core::{Hardware, Image, Infrastructure, Instance, InstanceRequest, InstanceScript, ScriptResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// One observed provider invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    CreateInstances { infra: String, count: usize },
    DeleteInstance { infra: String, instance: String },
    ListInstances { infra: String },
    ExecuteScript { infra: String, instance: String, scripts: usize },
    ListImages { infra: String },
    DeleteInfrastructure { infra: String },
}

/// An [`InfrastructureProvider`] that records calls and serves canned data.
pub struct RecordingProvider {
    infra_type: String,
    calls: Mutex<Vec<ProviderCall>>,
    live_instances: Mutex<Vec<Instance>>,
    images: Mutex<Vec<Image>>,
    fail_teardown: AtomicBool,
    fail_instance_deletes: AtomicBool,
}

impl RecordingProvider {
    pub fn new(infra_type: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            infra_type: infra_type.into(),
            calls: Mutex::new(Vec::new()),
            live_instances: Mutex::new(Vec::new()),
            images: Mutex::new(Vec::new()),
            fail_teardown: AtomicBool::new(false),
            fail_instance_deletes: AtomicBool::new(false),
        })
    }

    /// Make every `delete_infrastructure` call fail.
    pub fn with_failing_teardown(self: Arc<Self>) -> Arc<Self> {
        self.fail_teardown.store(true, Ordering::SeqCst);
        self
    }

    /// Make every `delete_instance` call fail from now on.
    pub fn fail_instance_deletes(&self) {
        self.fail_instance_deletes.store(true, Ordering::SeqCst);
    }

    /// What `list_instances` reports as live backend state.
    pub fn set_live_instances(&self, instances: Vec<Instance>) {
        *self.live_instances.lock().unwrap() = instances;
    }

    /// What `list_images` reports.
    pub fn set_images(&self, images: Vec<Image>) {
        *self.images.lock().unwrap() = images;
    }

    /// Every call observed so far, in order.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl InfrastructureProvider for RecordingProvider {
    fn infra_type(&self) -> &str {
        &self.infra_type
    }

    async fn create_instances(
        &self,
        infrastructure: &Infrastructure,
        request: &InstanceRequest,
    ) -> Result<Vec<Instance>> {
        let count = request.instance_count.parse().unwrap_or(1);
        self.record(ProviderCall::CreateInstances {
            infra: infrastructure.id.clone(),
            count,
        });

        let created: Vec<Instance> = (0..count)
            .map(|_| Instance {
                id: format!("i-{}", Uuid::new_v4().simple()),
                tag: request.tag.clone(),
                image: request.image.clone(),
                instance_count: request.instance_count.clone(),
                ram: request.ram.clone(),
                cpu: request.cpu.clone(),
                status: "pending".to_string(),
                post_boot_script: request.post_boot_script.clone(),
            })
            .collect();
        Ok(created)
    }

    async fn delete_instance(
        &self,
        infrastructure: &Infrastructure,
        instance_id: &str,
    ) -> Result<()> {
        self.record(ProviderCall::DeleteInstance {
            infra: infrastructure.id.clone(),
            instance: instance_id.to_string(),
        });
        if self.fail_instance_deletes.load(Ordering::SeqCst) {
            return Err(ProviderError::Api("injected instance delete failure".to_string()));
        }
        Ok(())
    }

    async fn list_instances(&self, infrastructure: &Infrastructure) -> Result<Vec<Instance>> {
        self.record(ProviderCall::ListInstances {
            infra: infrastructure.id.clone(),
        });
        Ok(self.live_instances.lock().unwrap().clone())
    }

    async fn execute_script(
        &self,
        infrastructure: &Infrastructure,
        instance_id: &str,
        script: &InstanceScript,
    ) -> Result<ScriptResult> {
        self.record(ProviderCall::ExecuteScript {
            infra: infrastructure.id.clone(),
            instance: instance_id.to_string(),
            scripts: script.scripts.len(),
        });
        Ok(ScriptResult::ok(format!(
            "ran {} script(s) on {instance_id}",
            script.scripts.len()
        )))
    }

    async fn list_images(&self, infrastructure: &Infrastructure) -> Result<Vec<Image>> {
        self.record(ProviderCall::ListImages {
            infra: infrastructure.id.clone(),
        });
        Ok(self.images.lock().unwrap().clone())
    }

    async fn list_hardware(&self, _infrastructure: &Infrastructure) -> Result<Vec<Hardware>> {
        Ok(vec![Hardware {
            cores: 2,
            ram_mb: 4096,
            disk_gb: 40,
        }])
    }

    async fn delete_infrastructure(&self, infrastructure: &Infrastructure) -> Result<()> {
        self.record(ProviderCall::DeleteInfrastructure {
            infra: infrastructure.id.clone(),
        });
        if self.fail_teardown.load(Ordering::SeqCst) {
            return Err(ProviderError::Api("injected teardown failure".to_string()));
        }
        Ok(())
    }
}
