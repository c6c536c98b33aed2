//! Typed client for one storage node

use crate::error::{CoordinatorError, Result};
use shard_core::{ColumnSchema, Dataset, Predicate, Row, RowId, TableSchema};
use shard_network::{ClientEnd, Request, Response};

/// Coordinator's handle on one storage node, reached through its internal end
#[derive(Debug, Clone)]
pub struct NodeProxy {
    node_id: String,
    end: ClientEnd,
}

impl NodeProxy {
    pub fn new(node_id: impl Into<String>, end: ClientEnd) -> Self {
        Self {
            node_id: node_id.into(),
            end,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    async fn call(&self, request: Request) -> Result<Response> {
        self.end
            .call(request)
            .await
            .map_err(|source| CoordinatorError::NodeUnreachable {
                node: self.node_id.clone(),
                source,
            })
    }

    pub async fn say_hello(&self, visitor: &str) -> Result<String> {
        match self
            .call(Request::SayHello {
                visitor: visitor.to_string(),
            })
            .await?
        {
            Response::Greeting(greeting) => Ok(greeting),
            other => Err(unexpected("RPCSayHello", other)),
        }
    }

    pub async fn get_full_schema(&self, fragment: &str) -> Result<Option<Vec<ColumnSchema>>> {
        match self
            .call(Request::GetFullSchema {
                fragment: fragment.to_string(),
            })
            .await?
        {
            Response::Columns(columns) => Ok(columns),
            other => Err(unexpected("RPCGetFullSchema", other)),
        }
    }

    pub async fn scan_line_data(&self, fragment: &str, row_id: &RowId) -> Result<Dataset> {
        match self
            .call(Request::ScanLineData {
                fragment: fragment.to_string(),
                row_id: row_id.to_string(),
            })
            .await?
        {
            Response::Dataset(dataset) => Ok(dataset),
            other => Err(unexpected("RPCScanLineData", other)),
        }
    }

    pub async fn create_table(
        &self,
        schema: &TableSchema,
        predicate: &Predicate,
        full_schema: &TableSchema,
    ) -> Result<String> {
        match self
            .call(Request::CreateTable {
                schema: schema.clone(),
                predicate: predicate.clone(),
                full_schema: full_schema.clone(),
            })
            .await?
        {
            Response::Status(status) => Ok(status),
            other => Err(unexpected("RPCCreateTable", other)),
        }
    }

    pub async fn insert(&self, fragment: &str, row: &Row) -> Result<String> {
        match self
            .call(Request::Insert {
                fragment: fragment.to_string(),
                row: row.clone(),
            })
            .await?
        {
            Response::Status(status) => Ok(status),
            other => Err(unexpected("RPCInsert", other)),
        }
    }
}

pub(crate) fn unexpected(method: &'static str, reply: Response) -> CoordinatorError {
    CoordinatorError::UnexpectedReply {
        method,
        reply: format!("{:?}", reply),
    }
}
