//! Nimbus Control Plane
//!
//! Orchestration layer between the (external) REST surface and the provider
//! backends. Services validate intent, read current state from the registry,
//! call the provider abstraction for the effectful operation, then write the
//! outcome back. The registry never calls providers; providers never touch
//! the registry.
//!
//! Everything here is constructed explicitly at bootstrap and threaded
//! through [`CloudManager`]; there is no process-global state.

pub mod error;
pub mod infrastructure_service;
pub mod instance_service;
pub mod manager;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use error::{ControlPlaneError, Result};
pub use infrastructure_service::InfrastructureService;
pub use instance_service::InstanceService;
pub use manager::{CloudManager, SweepReport};
pub use settings::ControlPlaneSettings;
