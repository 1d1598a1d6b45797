use thiserror::Error;

/// Errors that can occur anywhere in the recording pipeline.
///
/// Most of these are recoverable: the controller logs them and keeps the
/// pipeline running in a degraded mode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("encoder unavailable: {0}")]
    EncoderUnavailable(String),

    #[error("encoder session is not open")]
    EncoderNotOpen,

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("frame conversion failed: {0}")]
    ConversionFailed(String),

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("encoding worker failed: {0}")]
    WorkerFailed(String),
}
