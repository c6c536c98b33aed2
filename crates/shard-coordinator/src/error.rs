//! Error types for the coordinator

use shard_core::ShardError;
use shard_network::NetworkError;
use thiserror::Error;

/// Errors raised inside coordinator operations. The operations themselves
/// answer clients with a status string or a dataset; these never cross that
/// boundary.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// A node could not be reached or its reply was lost
    #[error("{node}: {source}")]
    NodeUnreachable {
        node: String,
        #[source]
        source: NetworkError,
    },

    /// A node answered with a failure status
    #[error("Node {node} rejected {method}: {status}")]
    Rejected {
        node: String,
        method: &'static str,
        status: String,
    },

    /// Reply variant did not match the request
    #[error("Unexpected reply to {method}: {reply}")]
    UnexpectedReply { method: &'static str, reply: String },

    /// Table was never built
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Invalid cluster configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(#[from] NetworkError),

    /// Row/schema model error
    #[error("Model error: {0}")]
    ModelError(#[from] ShardError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;
