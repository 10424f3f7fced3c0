//! Provider trait definition and type-string dispatch

use crate::error::Result;
use async_trait::async_trait;
use nimbus_core::{Hardware, Image, Infrastructure, Instance, InstanceRequest, InstanceScript, ScriptResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Lifecycle operations one backend implements for its infrastructure type.
///
/// Implementations are free to memoize expensive client handles keyed by
/// infrastructure identity; that pooling is provider-internal and invisible
/// here. Every method may block on network I/O, which is why the
/// orchestration layer never spans a call with a registry borrow.
#[async_trait]
pub trait InfrastructureProvider: Send + Sync {
    /// The infrastructure type string this provider serves (e.g. "aws").
    fn infra_type(&self) -> &str;

    /// Provision instances. One request may ask for N nodes; the returned set
    /// holds every record the backend created.
    async fn create_instances(
        &self,
        infrastructure: &Infrastructure,
        request: &InstanceRequest,
    ) -> Result<Vec<Instance>>;

    /// Terminate one instance at the backend.
    async fn delete_instance(
        &self,
        infrastructure: &Infrastructure,
        instance_id: &str,
    ) -> Result<()>;

    /// Authoritative live instance state from the backend.
    async fn list_instances(&self, infrastructure: &Infrastructure) -> Result<Vec<Instance>>;

    /// Run a script batch on one instance and capture the outcome.
    async fn execute_script(
        &self,
        infrastructure: &Infrastructure,
        instance_id: &str,
        script: &InstanceScript,
    ) -> Result<ScriptResult>;

    /// Boot images available on this infrastructure.
    async fn list_images(&self, infrastructure: &Infrastructure) -> Result<Vec<Image>>;

    /// Hardware shapes available on this infrastructure. Backends without a
    /// hardware catalog report none.
    async fn list_hardware(&self, _infrastructure: &Infrastructure) -> Result<Vec<Hardware>> {
        Ok(Vec::new())
    }

    /// Tear down every backend-side resource of this infrastructure,
    /// independent of what the local registry currently lists.
    async fn delete_infrastructure(&self, infrastructure: &Infrastructure) -> Result<()>;
}

/// Provider implementations keyed by infrastructure type string.
///
/// Populated once at bootstrap, then shared read-only with the orchestration
/// services.
#[derive(Default)]
pub struct ProviderSet {
    providers: HashMap<String, Arc<dyn InfrastructureProvider>>,
}

impl ProviderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own type string. Registering a second
    /// provider for the same type replaces the first.
    pub fn register(&mut self, provider: Arc<dyn InfrastructureProvider>) {
        let infra_type = provider.infra_type().to_string();
        tracing::debug!(infra_type = %infra_type, "provider registered");
        self.providers.insert(infra_type, provider);
    }

    /// Resolve the provider bound to `infra_type`, if any.
    pub fn resolve(&self, infra_type: &str) -> Option<Arc<dyn InfrastructureProvider>> {
        self.providers.get(infra_type).cloned()
    }

    /// Type strings with a bound provider.
    pub fn types(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
