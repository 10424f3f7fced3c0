//! Control plane settings
//!
//! Loaded by bootstrap before the provider set is built: an optional settings
//! file, overridden by `NIMBUS_`-prefixed environment variables.

use crate::error::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Tunables the bootstrap feeds into provider construction and registration
/// defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlPlaneSettings {
    /// Wall-clock budget handed to provider backends, in seconds
    pub provider_timeout_secs: u64,

    /// Applied when a registration payload omits the flag
    pub default_remove_on_shutdown: bool,

    /// Infrastructure type strings bootstrap builds providers for
    pub enabled_provider_types: Vec<String>,
}

impl Default for ControlPlaneSettings {
    fn default() -> Self {
        Self {
            provider_timeout_secs: 120,
            default_remove_on_shutdown: false,
            enabled_provider_types: Vec::new(),
        }
    }
}

impl ControlPlaneSettings {
    /// Load settings from an optional file plus environment overrides.
    ///
    /// Environment wins over the file; unset values fall back to the
    /// defaults above.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix("NIMBUS").try_parsing(true));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}
