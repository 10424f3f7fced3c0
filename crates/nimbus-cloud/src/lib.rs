//! Nimbus cloud provider abstraction
//!
//! One [`InfrastructureProvider`] implementation exists per infrastructure
//! type string ("aws", "openstack", ...). The orchestration layer resolves
//! the implementation from a [`ProviderSet`] at call time and holds no
//! vendor-specific logic of its own; providers in turn never touch the
//! registry. Backend client handles, credential use, retries and timeouts
//! all live behind this seam.

pub mod error;
pub mod provider;

// Re-exports
pub use error::{ProviderError, Result};
pub use provider::{InfrastructureProvider, ProviderSet};
