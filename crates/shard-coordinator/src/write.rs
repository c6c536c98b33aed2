//! Write fan-out

use crate::cluster::Cluster;
use crate::error::{CoordinatorError, Result};
use crate::fanout::fan_out;
use crate::proxy::NodeProxy;
use shard_core::status::{self, NOT_INSERTED, OK};
use shard_core::{Row, RowId, TableSchema};

impl Cluster {
    /// Write `row` to every fragment of `table` on every node. Each fragment
    /// keeps the row only if its predicate accepts it.
    pub async fn fragment_write(&self, table: &str, row: Row) -> String {
        match self.try_fragment_write(table, row).await {
            Ok(true) => OK.to_string(),
            Ok(false) => NOT_INSERTED.to_string(),
            Err(e) => {
                tracing::warn!("Write to {} failed: {}", table, e);
                NOT_INSERTED.to_string()
            }
        }
    }

    async fn try_fragment_write(&self, table: &str, mut row: Row) -> Result<bool> {
        let fragment_count = self
            .catalog
            .fragment_count(table)
            .ok_or_else(|| CoordinatorError::TableNotFound(table.to_string()))?;

        let mut targets: Vec<(NodeProxy, String)> = Vec::new();
        for node_id in self.node_ids() {
            let proxy = self.proxy(node_id)?;
            for index in 0..fragment_count {
                targets.push((proxy.clone(), TableSchema::fragment_name(table, index)));
            }
        }

        let row_id = RowId::new();
        self.catalog.record_row(table, row_id);
        row.push(row_id.to_value());

        let row = &row;
        let acks = fan_out(self.config.dispatch, targets, |(proxy, fragment)| async move {
            match proxy.insert(&fragment, row).await {
                Ok(reply) if status::is_success(&reply) => true,
                Ok(reply) => {
                    tracing::debug!("{} on {} declined row: {}", fragment, proxy.node_id(), reply);
                    false
                }
                Err(e) => {
                    tracing::debug!("Insert into {} failed: {}", fragment, e);
                    false
                }
            }
        })
        .await;

        let accepted = acks.iter().filter(|ack| **ack).count();
        tracing::debug!(
            "Row {} of {} accepted by {} of {} fragment replicas",
            row_id,
            table,
            accepted,
            acks.len()
        );
        Ok(self.config.write_policy.settle(acks))
    }
}
