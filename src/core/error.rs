//! Error types for the application

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A telemetry read failed; the tick is skipped and the last snapshot stays visible
    #[error("Telemetry source unavailable: {0}")]
    SourceUnavailable(String),

    /// A boost command was refused or failed; boost state is left unchanged
    #[error("Boost control rejected: {0}")]
    ControlRejected(String),

    #[error("Hardware not supported: {0}")]
    HardwareNotSupported(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl Error {
    /// Wrap any failure from a boost step as `ControlRejected`, keeping
    /// an existing rejection as is.
    pub fn into_rejection(self, step: &str) -> Error {
        match self {
            Error::ControlRejected(_) => self,
            other => Error::ControlRejected(format!("{}: {}", step, other)),
        }
    }
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;
