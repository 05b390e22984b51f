//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while talking to the backend.
///
/// Every variant here is recoverable: transport failures feed the reconnect
/// loop, decode failures drop a single frame.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Connection could not be made, or a read failed mid-stream.
    #[error("network error: {0}")]
    Network(String),

    /// Backend answered with a non-2xx status.
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A frame parsed but did not describe a usable event.
    #[error("decode error: {0}")]
    Decode(String),

    /// The live stream reached end of input.
    #[error("stream closed")]
    StreamClosed,

    /// A background task panicked or was aborted.
    #[error("task failed: {0}")]
    Task(String),
}

impl SyncError {
    /// Whether this error came from the transport rather than from a frame.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SyncError::Network(_) | SyncError::HttpStatus(_) | SyncError::StreamClosed
        )
    }
}
