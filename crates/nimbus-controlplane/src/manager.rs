//! Control plane composition root and shutdown coordination

use crate::infrastructure_service::InfrastructureService;
use crate::instance_service::InstanceService;
use nimbus_cloud::ProviderSet;
use nimbus_registry::{InfrastructureStore, InstanceStore};
use std::sync::Arc;

/// Owns the registry stores, the provider set and both services.
///
/// Built once at bootstrap and handed to the REST layer; the registry it
/// carries is the only core state needing ordered teardown, which
/// [`CloudManager::shutdown_sweep`] performs.
pub struct CloudManager {
    infrastructure_service: InfrastructureService,
    instance_service: InstanceService,
}

impl CloudManager {
    pub fn new(providers: ProviderSet) -> Self {
        let infrastructures = Arc::new(InfrastructureStore::new());
        let instances = Arc::new(InstanceStore::new());
        let providers = Arc::new(providers);

        Self {
            infrastructure_service: InfrastructureService::new(
                Arc::clone(&infrastructures),
                Arc::clone(&instances),
                Arc::clone(&providers),
            ),
            instance_service: InstanceService::new(infrastructures, instances, providers),
        }
    }

    pub fn infrastructures(&self) -> &InfrastructureService {
        &self.infrastructure_service
    }

    pub fn instances(&self) -> &InstanceService {
        &self.instance_service
    }

    /// Deregister every infrastructure flagged `remove_on_shutdown`.
    ///
    /// Runs over a snapshot taken at entry; each deregistration is
    /// independent and a failure never stops the remaining ones. Invoked once
    /// before process exit; calling it again over the emptied registry
    /// performs zero operations.
    pub async fn shutdown_sweep(&self) -> SweepReport {
        let snapshot = self.infrastructure_service.list();
        let mut report = SweepReport::default();

        for (id, infrastructure) in snapshot.iter() {
            if !infrastructure.remove_on_shutdown {
                tracing::debug!(id = %id, "shutdown sweep: keeping infrastructure");
                continue;
            }

            match self.infrastructure_service.deregister(id).await {
                Ok(()) => {
                    tracing::info!(id = %id, "shutdown sweep: infrastructure removed");
                    report.removed.push(id.clone());
                }
                Err(error) => {
                    tracing::warn!(id = %id, %error, "shutdown sweep: deregistration failed");
                    report.failed.push((id.clone(), error.to_string()));
                }
            }
        }

        report
    }
}

/// Outcome of one [`CloudManager::shutdown_sweep`] run.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Ids deregistered cleanly
    pub removed: Vec<String>,

    /// Ids whose deregistration returned an error, with the message
    pub failed: Vec<(String, String)>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.removed.len() + self.failed.len()
    }
}
