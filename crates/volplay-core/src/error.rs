//! Error types for Volplay.

use thiserror::Error;

/// Main error type for Volplay operations.
///
/// Decoder stalls are not errors: they surface as
/// [`ModelUpdate::Unchanged`](crate::ModelUpdate::Unchanged) and playback keeps
/// presenting the last published frame.
#[derive(Error, Debug)]
pub enum VolplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sequence could not be located or is malformed.
    #[error("Sequence source not found: {0}")]
    SourceNotFound(String),

    #[error("Unknown event name: {0}")]
    UnknownEventName(String),

    /// The handle does not refer to an open sequence.
    #[error("Invalid or closed sequence handle")]
    InvalidHandle,

    #[error("Frame {frame} is outside the active range [{first}, {last}]")]
    FrameOutOfRange { frame: u32, first: u32, last: u32 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Player is not initialized")]
    NotInitialized,

    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Volplay operations.
pub type Result<T> = std::result::Result<T, VolplayError>;
