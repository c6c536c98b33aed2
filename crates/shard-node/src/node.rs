//! Storage node answering the coordinator's RPCs

use crate::fragment::LocalFragment;
use async_trait::async_trait;
use parking_lot::RwLock;
use shard_core::status::{self, OK};
use shard_core::{ColumnSchema, Dataset, Predicate, Row, TableSchema};
use shard_network::NodeRpc;
use std::collections::HashMap;

/// A storage node holding fragments by qualified name (`<table>|<index>`)
pub struct StorageNode {
    identifier: String,
    fragments: RwLock<HashMap<String, LocalFragment>>,
}

impl StorageNode {
    /// Create a new node
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fragments: RwLock::new(HashMap::new()),
        }
    }

    /// Get node identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Names of hosted fragments, sorted
    pub fn fragment_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fragments.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Schema of a hosted fragment
    pub fn fragment_schema(&self, fragment: &str) -> Option<TableSchema> {
        self.fragments.read().get(fragment).map(|f| f.schema().clone())
    }

    /// Number of rows in a hosted fragment
    pub fn row_count(&self, fragment: &str) -> Option<usize> {
        self.fragments.read().get(fragment).map(|f| f.row_count())
    }
}

#[async_trait]
impl NodeRpc for StorageNode {
    async fn say_hello(&self, visitor: String) -> String {
        format!("Hello {}, I am {}", visitor, self.identifier)
    }

    async fn get_full_schema(&self, fragment: String) -> Option<Vec<ColumnSchema>> {
        self.fragments
            .read()
            .get(&fragment)
            .map(|f| f.schema().columns.clone())
    }

    async fn scan_line_data(&self, fragment: String, row_id: String) -> Dataset {
        let fragments = self.fragments.read();
        match fragments.get(&fragment).and_then(|f| Some((f, f.get(&row_id)?))) {
            Some((f, row)) => Dataset::single(f.schema().clone(), row.clone()),
            None => Dataset::not_found(),
        }
    }

    async fn create_table(
        &self,
        schema: TableSchema,
        predicate: Predicate,
        full_schema: TableSchema,
    ) -> String {
        let name = schema.table_name.clone();
        match LocalFragment::new(schema, predicate, full_schema) {
            Ok(fragment) => {
                let replaced = self.fragments.write().insert(name.clone(), fragment).is_some();
                tracing::debug!(
                    "{} {} fragment {}",
                    self.identifier,
                    if replaced { "replaced" } else { "created" },
                    name
                );
                OK.to_string()
            }
            Err(e) => {
                tracing::warn!("{} refused fragment {}: {}", self.identifier, name, e);
                status::failure(e)
            }
        }
    }

    async fn insert(&self, fragment: String, row: Row) -> String {
        let mut fragments = self.fragments.write();
        let Some(target) = fragments.get_mut(&fragment) else {
            return status::failure("Table Not Exist");
        };
        match target.insert(&row) {
            Ok(()) => OK.to_string(),
            Err(rejection) => {
                tracing::debug!("{} rejected row for {}: {}", self.identifier, fragment, rejection);
                status::failure(rejection)
            }
        }
    }
}
