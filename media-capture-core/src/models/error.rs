use thiserror::Error;

/// Errors that can occur during media capture operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
