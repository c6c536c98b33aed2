//! Request/response types carried by the network

use crate::error::{NetworkError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shard_core::{ColumnSchema, Dataset, Predicate, Row, TableSchema};

/// Every RPC a server on the network can receive. Storage nodes answer the
/// node methods, the coordinator answers the coordinator methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Diagnostic greeting (node and coordinator)
    SayHello { visitor: String },

    /// Column list of a fragment hosted by a node
    GetFullSchema { fragment: String },

    /// Row with the given identity from a node's fragment
    ScanLineData { fragment: String, row_id: String },

    /// Create or replace a fragment on a node
    CreateTable {
        schema: TableSchema,
        predicate: Predicate,
        full_schema: TableSchema,
    },

    /// Insert an augmented row into a node's fragment
    Insert { fragment: String, row: Row },

    /// Fragment a table across the cluster
    BuildTable {
        schema: TableSchema,
        sharding: Vec<u8>,
    },

    /// Write one row to every fragment of a table
    FragmentWrite { table: String, row: Row },

    /// Natural join of the first two tables
    Join { tables: Vec<String> },
}

impl Request {
    /// Method name used in logs and counters
    pub fn method(&self) -> &'static str {
        match self {
            Request::SayHello { .. } => "SayHello",
            Request::GetFullSchema { .. } => "GetFullSchema",
            Request::ScanLineData { .. } => "ScanLineData",
            Request::CreateTable { .. } => "RPCCreateTable",
            Request::Insert { .. } => "RPCInsert",
            Request::BuildTable { .. } => "BuildTable",
            Request::FragmentWrite { .. } => "FragmentWrite",
            Request::Join { .. } => "Join",
        }
    }
}

/// Replies to [`Request`]s
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Greeting(String),
    /// `None` when the fragment is absent on the node
    Columns(Option<Vec<ColumnSchema>>),
    Dataset(Dataset),
    Status(String),
    /// The server does not implement the requested method
    Unsupported(String),
}

/// Serialized message as it travels over the simulated wire
#[derive(Debug, Clone)]
pub struct WireMessage {
    /// JSON-encoded payload
    pub data: Vec<u8>,
}

impl WireMessage {
    /// Encode a message, refusing payloads above `max_size` bytes
    pub fn encode<T: Serialize>(message: &T, max_size: usize) -> Result<Self> {
        let data = serde_json::to_vec(message)
            .map_err(|e| NetworkError::SerializationError(e.to_string()))?;
        if data.len() > max_size {
            return Err(NetworkError::MessageTooLarge {
                size: data.len(),
                max: max_size,
            });
        }
        Ok(Self { data })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.data)
            .map_err(|e| NetworkError::SerializationError(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_core::{DataType, Value};

    #[test]
    fn test_wire_message_carries_request() {
        let request = Request::Insert {
            fragment: "Person|0".into(),
            row: vec![Value::from("Alice"), Value::Int(30), Value::Null],
        };
        let wire = WireMessage::encode(&request, 1024).unwrap();
        assert!(!wire.is_empty());

        let decoded: Request = wire.decode().unwrap();
        assert_eq!(decoded, request);
        assert_eq!(decoded.method(), "RPCInsert");
    }

    #[test]
    fn test_wire_message_size_limit() {
        let response = Response::Columns(Some(vec![ColumnSchema::new("name", DataType::Utf8)]));
        let err = WireMessage::encode(&response, 4).unwrap_err();
        assert!(matches!(err, NetworkError::MessageTooLarge { max: 4, .. }));
    }

    #[test]
    fn test_wire_message_decode_failure() {
        let wire = WireMessage {
            data: b"not json".to_vec(),
        };
        assert!(matches!(
            wire.decode::<Response>(),
            Err(NetworkError::SerializationError(_))
        ));
    }
}
