//! Control plane error taxonomy
//!
//! The registry itself never raises domain errors; absence there is `None`.
//! This layer is the single place where registry absence and provider
//! failures become typed errors for the REST boundary (`*NotFound` maps to a
//! client error class, everything else to a server error class).

use nimbus_cloud::ProviderError;
use thiserror::Error;

/// Control plane errors
#[derive(Error, Debug)]
pub enum ControlPlaneError {
    #[error("infrastructure '{0}' is not registered")]
    InfrastructureNotFound(String),

    #[error("instance '{instance}' is not known on infrastructure '{infrastructure}'")]
    InstanceNotFound {
        infrastructure: String,
        instance: String,
    },

    #[error("no provider is bound to infrastructure type '{0}'")]
    UnsupportedInfrastructureType(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("registry invariant violated: {0}")]
    InvariantViolation(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ControlPlaneError>;
