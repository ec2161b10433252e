use thiserror::Error;

/// Common error types for the hosting manager
#[derive(Error, Debug, Clone)]
pub enum HosterError {
    /// Unauthorized principal
    #[error("{0}")]
    AccessDenied(String),

    /// Malformed command arguments
    #[error("{0}")]
    BadCommand(String),

    /// Stop target has no tracked process
    #[error("{0}")]
    NotRunning(String),

    /// Clone step failures
    #[error("{0}")]
    DeployFailed(String),

    /// Dependency install failures
    #[error("{0}")]
    DependencyInstall(String),

    /// Entry point spawn failures
    #[error("{0}")]
    SpawnFailed(String),

    /// Persisted-state I/O failures
    #[error("{0}")]
    Storage(String),

    /// Bounded step timeouts
    #[error("{0}")]
    Timeout(String),

    /// Signal delivery / liveness probe failures
    #[error("{0}")]
    ProcessControl(String),

    /// Configuration related errors
    #[error("{0}")]
    Configuration(String),

    /// Actor spawn errors
    #[error("{0}")]
    Spawn(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String)
}

/// Convert from anyhow::Error
impl From<anyhow::Error> for HosterError {
    fn from(err: anyhow::Error) -> Self {
        HosterError::Generic(err.to_string())
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for HosterError {
    fn from(err: std::io::Error) -> Self {
        HosterError::Storage(err.to_string())
    }
}

/// Convert from serde_json::Error
impl From<serde_json::Error> for HosterError {
    fn from(err: serde_json::Error) -> Self {
        HosterError::Storage(err.to_string())
    }
}

/// Convert from ractor::SpawnErr
impl From<ractor::SpawnErr> for HosterError {
    fn from(err: ractor::SpawnErr) -> Self {
        HosterError::Spawn(err.to_string())
    }
}
