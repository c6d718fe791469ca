use thiserror::Error;

/// Error taxonomy shared by the skin-archive and audio paths.
///
/// Archive and decode failures are recoverable: the control thread reports
/// them to whoever asked for the load and keeps running. `DeviceError` from
/// the initial device open is the one fatal case, handled by the caller.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("malformed archive: {0}")]
    Malformed(&'static str),

    #[error("unsupported compression method {0} (only stored entries are readable)")]
    UnsupportedCompression(u16),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("audio data truncated: declared length exceeds available bytes")]
    Truncated,

    #[error("audio device error: {0}")]
    DeviceError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
