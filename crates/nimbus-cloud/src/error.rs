//! Provider error types

use thiserror::Error;

/// Failure reported by a provider backend.
///
/// The message is the backend's own; the orchestration layer surfaces it
/// verbatim and never branches on its content.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("backend API error: {0}")]
    Api(String),

    #[error("backend resource not found: {0}")]
    ResourceNotFound(String),

    #[error("backend operation timed out: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
