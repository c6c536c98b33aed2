//! Server-side dispatch
//!
//! A server registered on the network is a [`Service`]. The RPC surfaces of
//! storage nodes and of the coordinator are spelled out as the [`NodeRpc`]
//! and [`CoordinatorRpc`] traits; [`NodeService`] and [`CoordinatorService`]
//! adapt an implementation of either to a [`Service`] by matching on the
//! request variant.

use crate::message::{Request, Response};
use async_trait::async_trait;
use shard_core::{ColumnSchema, Dataset, Predicate, Row, TableSchema};
use std::sync::Arc;

/// Anything that can answer requests delivered by the network
#[async_trait]
pub trait Service: Send + Sync + 'static {
    async fn handle(&self, request: Request) -> Response;
}

/// Operations a storage node exposes to the coordinator
#[async_trait]
pub trait NodeRpc: Send + Sync + 'static {
    async fn say_hello(&self, visitor: String) -> String;

    /// Column list of `fragment`, or `None` if this node does not host it
    async fn get_full_schema(&self, fragment: String) -> Option<Vec<ColumnSchema>>;

    /// One-row dataset holding `row_id`, or the not-found sentinel
    async fn scan_line_data(&self, fragment: String, row_id: String) -> Dataset;

    /// Create or replace a fragment; status starting with `'0'` on success
    async fn create_table(
        &self,
        schema: TableSchema,
        predicate: Predicate,
        full_schema: TableSchema,
    ) -> String;

    /// Insert an augmented row; status starting with `'0'` on success
    async fn insert(&self, fragment: String, row: Row) -> String;
}

/// Operations the coordinator exposes to clients
#[async_trait]
pub trait CoordinatorRpc: Send + Sync + 'static {
    async fn say_hello(&self, visitor: String) -> String;

    async fn build_table(&self, schema: TableSchema, sharding: Vec<u8>) -> String;

    async fn fragment_write(&self, table: String, row: Row) -> String;

    async fn join(&self, tables: Vec<String>) -> Dataset;
}

/// Serves a [`NodeRpc`] implementation on the network
pub struct NodeService<T> {
    node: Arc<T>,
}

impl<T: NodeRpc> NodeService<T> {
    pub fn new(node: Arc<T>) -> Self {
        Self { node }
    }
}

#[async_trait]
impl<T: NodeRpc> Service for NodeService<T> {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::SayHello { visitor } => Response::Greeting(self.node.say_hello(visitor).await),
            Request::GetFullSchema { fragment } => {
                Response::Columns(self.node.get_full_schema(fragment).await)
            }
            Request::ScanLineData { fragment, row_id } => {
                Response::Dataset(self.node.scan_line_data(fragment, row_id).await)
            }
            Request::CreateTable {
                schema,
                predicate,
                full_schema,
            } => Response::Status(
                self.node
                    .create_table(schema, predicate, full_schema)
                    .await,
            ),
            Request::Insert { fragment, row } => {
                Response::Status(self.node.insert(fragment, row).await)
            }
            other => Response::Unsupported(other.method().to_string()),
        }
    }
}

/// Serves a [`CoordinatorRpc`] implementation on the network
pub struct CoordinatorService<T> {
    coordinator: Arc<T>,
}

impl<T: CoordinatorRpc> CoordinatorService<T> {
    pub fn new(coordinator: Arc<T>) -> Self {
        Self { coordinator }
    }
}

#[async_trait]
impl<T: CoordinatorRpc> Service for CoordinatorService<T> {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::SayHello { visitor } => {
                Response::Greeting(self.coordinator.say_hello(visitor).await)
            }
            Request::BuildTable { schema, sharding } => {
                Response::Status(self.coordinator.build_table(schema, sharding).await)
            }
            Request::FragmentWrite { table, row } => {
                Response::Status(self.coordinator.fragment_write(table, row).await)
            }
            Request::Join { tables } => Response::Dataset(self.coordinator.join(tables).await),
            other => Response::Unsupported(other.method().to_string()),
        }
    }
}
