//! Error types for network delivery

use thiserror::Error;

/// Ways a call can fail to deliver. None of these say anything about whether
/// the remote side applied the request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// End was never created
    #[error("End not found: {0}")]
    EndNotFound(String),

    /// End is disabled, unconnected, or its server is gone
    #[error("End {0} is disconnected")]
    Disconnected(String),

    /// Request lost before reaching the server
    #[error("Request from {0} dropped")]
    RequestDropped(String),

    /// Reply lost on the way back
    #[error("Reply to {0} dropped")]
    ReplyDropped(String),

    /// Call did not complete in time
    #[error("Call timed out after {0}ms")]
    Timeout(u64),

    /// Payload exceeds the configured limit
    #[error("Message of {size} bytes exceeds limit of {max} bytes")]
    MessageTooLarge { size: usize, max: usize },

    /// Encoding or decoding failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The network has been dropped
    #[error("Network has shut down")]
    Shutdown,
}

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetworkError>;
