//! Instance lifecycle service
//!
//! Every effectful operation follows the same shape: read the registry,
//! call the provider, write the outcome back. Registry snapshots are taken
//! immediately before the provider call and writes happen immediately after
//! it; no registry reference is ever held across the await.

use crate::error::{ControlPlaneError, Result};
use nimbus_cloud::{InfrastructureProvider, ProviderSet};
use nimbus_core::{Hardware, Image, Infrastructure, Instance, InstanceRequest, InstanceScript, ScriptResult};
use nimbus_registry::{InfrastructureStore, InstanceStore};
use std::sync::Arc;

/// Provisioning, teardown and script execution for instances.
#[derive(Clone)]
pub struct InstanceService {
    infrastructures: Arc<InfrastructureStore>,
    instances: Arc<InstanceStore>,
    providers: Arc<ProviderSet>,
}

impl InstanceService {
    pub fn new(
        infrastructures: Arc<InfrastructureStore>,
        instances: Arc<InstanceStore>,
        providers: Arc<ProviderSet>,
    ) -> Self {
        Self {
            infrastructures,
            instances,
            providers,
        }
    }

    fn resolve(&self, infra_id: &str) -> Result<(Infrastructure, Arc<dyn InfrastructureProvider>)> {
        let infrastructure = self
            .infrastructures
            .get(infra_id)
            .ok_or_else(|| ControlPlaneError::InfrastructureNotFound(infra_id.to_string()))?;
        let provider = self
            .providers
            .resolve(&infrastructure.infra_type)
            .ok_or_else(|| {
                ControlPlaneError::UnsupportedInfrastructureType(infrastructure.infra_type.clone())
            })?;
        Ok((infrastructure, provider))
    }

    /// Provision instances on a registered infrastructure.
    ///
    /// The provider decides how many records one request yields; every
    /// returned instance is stored, and the full set is handed back. A
    /// provider failure leaves the registry untouched.
    pub async fn create(&self, infra_id: &str, request: &InstanceRequest) -> Result<Vec<Instance>> {
        let (infrastructure, provider) = self.resolve(infra_id)?;

        tracing::info!(infra = %infra_id, tag = %request.tag, "creating instances");
        let created = provider.create_instances(&infrastructure, request).await?;

        for instance in &created {
            self.instances.put(infra_id, instance.clone());
        }
        tracing::info!(infra = %infra_id, count = created.len(), "instances created");
        Ok(created)
    }

    /// Terminate one instance.
    ///
    /// The registry entry is removed only after the backend confirms; on
    /// failure the entry stays, since the node may well still exist.
    pub async fn delete(&self, infra_id: &str, instance_id: &str) -> Result<()> {
        let (infrastructure, provider) = self.resolve(infra_id)?;
        self.get(infra_id, instance_id)?;

        tracing::info!(infra = %infra_id, instance = %instance_id, "deleting instance");
        provider.delete_instance(&infrastructure, instance_id).await?;

        self.instances.remove(infra_id, instance_id);
        Ok(())
    }

    /// Look up one stored instance.
    pub fn get(&self, infra_id: &str, instance_id: &str) -> Result<Instance> {
        self.instances.get(infra_id, instance_id).ok_or_else(|| {
            ControlPlaneError::InstanceNotFound {
                infrastructure: infra_id.to_string(),
                instance: instance_id.to_string(),
            }
        })
    }

    /// Instances currently recorded for one infrastructure.
    ///
    /// Pure registry read; the registry is the listing source of truth.
    /// Reconciling it against live backend state is [`Self::refresh`].
    pub fn list(&self, infra_id: &str) -> Result<Vec<Instance>> {
        if self.infrastructures.get(infra_id).is_none() {
            return Err(ControlPlaneError::InfrastructureNotFound(
                infra_id.to_string(),
            ));
        }
        Ok(self.instances.list_for(infra_id))
    }

    /// Reconcile the registry with authoritative backend state.
    ///
    /// The live set replaces the stored set in one snapshot swap: stale
    /// statuses update and vanished nodes disappear atomically.
    pub async fn refresh(&self, infra_id: &str) -> Result<Vec<Instance>> {
        let (infrastructure, provider) = self.resolve(infra_id)?;

        let live = provider.list_instances(&infrastructure).await?;
        tracing::debug!(infra = %infra_id, count = live.len(), "refreshed instances from backend");

        self.instances.replace_all_for(infra_id, live.clone());
        Ok(live)
    }

    /// Run a script batch on one instance and return the outcome verbatim.
    /// Output and error fields are the provider's; the core does not parse
    /// them.
    pub async fn execute_script(
        &self,
        infra_id: &str,
        instance_id: &str,
        script: &InstanceScript,
    ) -> Result<ScriptResult> {
        let (infrastructure, provider) = self.resolve(infra_id)?;
        self.get(infra_id, instance_id)?;

        tracing::info!(
            infra = %infra_id,
            instance = %instance_id,
            scripts = script.scripts.len(),
            "executing script batch"
        );
        let result = provider
            .execute_script(&infrastructure, instance_id, script)
            .await?;
        Ok(result)
    }

    /// Boot images available on one infrastructure. Read-only, never cached.
    pub async fn list_images(&self, infra_id: &str) -> Result<Vec<Image>> {
        let (infrastructure, provider) = self.resolve(infra_id)?;
        Ok(provider.list_images(&infrastructure).await?)
    }

    /// Hardware shapes available on one infrastructure. Read-only.
    pub async fn list_hardware(&self, infra_id: &str) -> Result<Vec<Hardware>> {
        let (infrastructure, provider) = self.resolve(infra_id)?;
        Ok(provider.list_hardware(&infrastructure).await?)
    }
}
