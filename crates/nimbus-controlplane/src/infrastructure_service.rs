//! Infrastructure lifecycle service
//!
//! Per infrastructure the lifecycle is Unregistered -> Registered ->
//! Unregistered. Registration is pure bookkeeping (no provider call, and it
//! doubles as update); deregistration tears the backend down through the
//! provider and always clears local state, whatever the backend said.

use crate::error::{ControlPlaneError, Result};
use nimbus_cloud::ProviderSet;
use nimbus_core::Infrastructure;
use nimbus_registry::{InfrastructureStore, InstanceStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Registration and teardown of infrastructures.
#[derive(Clone)]
pub struct InfrastructureService {
    infrastructures: Arc<InfrastructureStore>,
    instances: Arc<InstanceStore>,
    providers: Arc<ProviderSet>,
}

impl InfrastructureService {
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

    /// Register or update an infrastructure. Whole-record replace under an
    /// existing id; nothing is provisioned at the backend.
    pub fn register(&self, infrastructure: Infrastructure) {
        tracing::info!(
            id = %infrastructure.id,
            infra_type = %infrastructure.infra_type,
            "registering infrastructure"
        );
        self.infrastructures.put(infrastructure);
    }

    /// Look up one registered infrastructure.
    pub fn get(&self, id: &str) -> Result<Infrastructure> {
        self.infrastructures
            .get(id)
            .ok_or_else(|| ControlPlaneError::InfrastructureNotFound(id.to_string()))
    }

    /// Point-in-time snapshot of all registered infrastructures.
    pub fn list(&self) -> Arc<HashMap<String, Infrastructure>> {
        self.infrastructures.list()
    }

    /// Deregister an infrastructure and cascade-remove its instances.
    ///
    /// Unknown ids succeed without side effects (idempotent delete). For a
    /// known id the backend teardown is best-effort: its failure is returned
    /// to the caller, but the local records are dropped either way so the
    /// registry never lists an infrastructure the operator asked to drop.
    pub async fn deregister(&self, id: &str) -> Result<()> {
        let Some(infrastructure) = self.infrastructures.get(id) else {
            tracing::debug!(id = %id, "deregister: unknown infrastructure, nothing to do");
            return Ok(());
        };

        tracing::info!(id = %id, "deregistering infrastructure");

        let backend = match self.providers.resolve(&infrastructure.infra_type) {
            Some(provider) => provider
                .delete_infrastructure(&infrastructure)
                .await
                .map_err(ControlPlaneError::from),
            None => Err(ControlPlaneError::UnsupportedInfrastructureType(
                infrastructure.infra_type.clone(),
            )),
        };

        // Instances first: readers must never see instances whose
        // infrastructure is already gone from the listing.
        self.instances.remove_all_for(id);
        self.infrastructures.remove(id);

        if !self.instances.list_for(id).is_empty() {
            return Err(ControlPlaneError::InvariantViolation(format!(
                "cascade delete left instances behind for '{id}'"
            )));
        }

        if let Err(error) = &backend {
            tracing::warn!(id = %id, %error, "backend teardown failed, local records dropped");
        }
        backend
    }
}
