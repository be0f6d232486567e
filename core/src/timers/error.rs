//! Error types for registry setup

use thiserror::Error;

/// Errors while setting up the process-wide registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("countdown registry must be initialized inside a tokio runtime")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),

    #[error("countdown registry is already initialized")]
    AlreadyInitialized,
}
