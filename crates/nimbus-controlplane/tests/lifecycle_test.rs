//! End-to-end lifecycle scenarios against the recording provider.

use nimbus_cloud::ProviderSet;
use nimbus_controlplane::testing::{ProviderCall, RecordingProvider};
use nimbus_controlplane::{CloudManager, ControlPlaneError};
use nimbus_core::{Credentials, Infrastructure, InstanceRequest, InstanceScript};
use std::sync::Arc;

fn manager_with(provider: Arc<RecordingProvider>) -> CloudManager {
    let mut providers = ProviderSet::new();
    providers.register(provider);
    CloudManager::new(providers)
}

fn infra(id: &str, remove_on_shutdown: bool) -> Infrastructure {
    Infrastructure::new(id, "mock", "https://mock.example", Credentials::default())
        .with_remove_on_shutdown(remove_on_shutdown)
}

fn request(tag: &str, count: &str) -> InstanceRequest {
    InstanceRequest {
        tag: tag.to_string(),
        image: "ubuntu-24.04".to_string(),
        instance_count: count.to_string(),
        ram: "4096".to_string(),
        cpu: "2".to_string(),
        post_boot_script: None,
        options: None,
    }
}

#[tokio::test]
async fn full_lifecycle_register_provision_script_teardown() {
    let provider = RecordingProvider::new("mock");
    let manager = manager_with(Arc::clone(&provider));

    // register two infrastructures, one flagged for shutdown cleanup
    manager.infrastructures().register(infra("aws1", true));
    manager.infrastructures().register(infra("aws2", false));
    assert_eq!(manager.infrastructures().list().len(), 2);

    // provision three nodes on aws1
    let created = manager
        .instances()
        .create("aws1", &request("web", "3"))
        .await
        .unwrap();
    assert_eq!(created.len(), 3);
    assert_eq!(manager.instances().list("aws1").unwrap().len(), 3);
    assert!(manager.instances().list("aws2").unwrap().is_empty());

    // run a post-boot batch on the first node
    let script = InstanceScript::new(created[0].id.clone())
        .with_script("apt-get update")
        .with_script("apt-get install -y nginx");
    let result = manager
        .instances()
        .execute_script("aws1", &created[0].id, &script)
        .await
        .unwrap();
    assert!(!result.is_failure());

    // tear aws1 down: backend called once, cascade clears all three nodes
    manager.infrastructures().deregister("aws1").await.unwrap();
    assert!(matches!(
        manager.instances().list("aws1"),
        Err(ControlPlaneError::InfrastructureNotFound(_))
    ));
    for instance in &created {
        assert!(manager.instances().get("aws1", &instance.id).is_err());
    }

    // aws2 was never touched
    let calls = provider.calls();
    assert!(!calls.iter().any(|call| matches!(
        call,
        ProviderCall::DeleteInfrastructure { infra } if infra == "aws2"
    )));
    assert!(manager.infrastructures().get("aws2").is_ok());
}

#[tokio::test]
async fn shutdown_sweep_scenario() {
    let provider = RecordingProvider::new("mock");
    let manager = manager_with(Arc::clone(&provider));

    manager.infrastructures().register(infra("aws1", true));
    manager.infrastructures().register(infra("aws2", false));

    let report = manager.shutdown_sweep().await;
    assert_eq!(report.removed, vec!["aws1".to_string()]);

    let teardowns: Vec<_> = provider
        .calls()
        .into_iter()
        .filter(|call| matches!(call, ProviderCall::DeleteInfrastructure { .. }))
        .collect();
    assert_eq!(
        teardowns,
        vec![ProviderCall::DeleteInfrastructure {
            infra: "aws1".to_string()
        }]
    );

    let remaining = manager.infrastructures().list();
    assert_eq!(remaining.len(), 1);
    assert!(remaining.contains_key("aws2"));
}

#[tokio::test]
async fn listing_survives_concurrent_provisioning() {
    let provider = RecordingProvider::new("mock");
    let manager = Arc::new(manager_with(provider));
    manager.infrastructures().register(infra("aws1", false));

    // a reader snapshot taken before provisioning stays self-consistent
    let before = manager.infrastructures().list();

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                manager
                    .instances()
                    .create("aws1", &request(&format!("batch-{i}"), "2"))
                    .await
                    .unwrap()
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(before.len(), 1);
    assert_eq!(manager.instances().list("aws1").unwrap().len(), 8);
}
