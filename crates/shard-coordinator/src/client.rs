//! External client of a cluster, over the network

use crate::error::Result;
use crate::proxy::unexpected;
use shard_core::{Dataset, Row, ShardingSpec, TableSchema};
use shard_network::{ClientEnd, Network, Request, Response};

/// Reaches a cluster's coordinator through its own client end
#[derive(Debug, Clone)]
pub struct ClusterClient {
    end: ClientEnd,
}

impl ClusterClient {
    /// Open (or reuse) end `end_name`, point it at `cluster_name` and enable it
    pub fn connect(network: &Network, end_name: &str, cluster_name: &str) -> Self {
        let end = network.make_end(end_name);
        network.connect(end_name, cluster_name);
        network.enable(end_name, true);
        Self { end }
    }

    pub fn end_name(&self) -> &str {
        self.end.name()
    }

    pub async fn say_hello(&self, visitor: &str) -> Result<String> {
        match self
            .end
            .call(Request::SayHello {
                visitor: visitor.to_string(),
            })
            .await?
        {
            Response::Greeting(greeting) => Ok(greeting),
            other => Err(unexpected("SayHello", other)),
        }
    }

    pub async fn build_table(&self, schema: TableSchema, spec: &ShardingSpec) -> Result<String> {
        self.build_table_raw(schema, spec.to_json()?).await
    }

    /// Build with an already encoded sharding payload
    pub async fn build_table_raw(&self, schema: TableSchema, sharding: Vec<u8>) -> Result<String> {
        match self.end.call(Request::BuildTable { schema, sharding }).await? {
            Response::Status(status) => Ok(status),
            other => Err(unexpected("BuildTable", other)),
        }
    }

    pub async fn fragment_write(&self, table: &str, row: Row) -> Result<String> {
        match self
            .end
            .call(Request::FragmentWrite {
                table: table.to_string(),
                row,
            })
            .await?
        {
            Response::Status(status) => Ok(status),
            other => Err(unexpected("FragmentWrite", other)),
        }
    }

    pub async fn join<S: AsRef<str>>(&self, tables: &[S]) -> Result<Dataset> {
        let tables = tables.iter().map(|t| t.as_ref().to_string()).collect();
        match self.end.call(Request::Join { tables }).await? {
            Response::Dataset(dataset) => Ok(dataset),
            other => Err(unexpected("Join", other)),
        }
    }
}
