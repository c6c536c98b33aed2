use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShardError {
    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Invalid fragment name: {0}")]
    InvalidFragmentName(String),

    #[error("Invalid sharding spec: {0}")]
    InvalidShardingSpec(String),

    #[error("Invalid row id: {0}")]
    InvalidRowId(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShardError>;
