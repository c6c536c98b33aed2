//! Row reconstruction from fragments spread over the nodes

use crate::cluster::Cluster;
use crate::fanout::fan_out;
use crate::proxy::NodeProxy;
use shard_core::{ColumnSchema, Dataset, Row, RowId, TableSchema, Value};

impl Cluster {
    /// Reassemble row `row_id` of `table` with columns in `column_order`.
    ///
    /// Each node contributes the non-id columns of the first of its fragments
    /// holding the row. Columns no reachable node holds are left out of the
    /// row. If no node holds the row the not-found dataset is returned.
    pub async fn reconstruct_row(
        &self,
        table: &str,
        row_id: &RowId,
        column_order: &[ColumnSchema],
    ) -> Dataset {
        let fragment_count = self.catalog.fragment_count(table).unwrap_or(0);
        let found = fan_out(self.config.dispatch, self.node_proxies(), |proxy| async move {
            first_match(&proxy, table, row_id, fragment_count).await
        })
        .await;

        let mut found_any = false;
        let mut columns: Vec<(ColumnSchema, Value)> = Vec::new();
        for dataset in found.into_iter().flatten() {
            let Some(row) = dataset.first_row() else {
                continue;
            };
            found_any = true;
            columns.extend(
                dataset
                    .schema
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .skip(1),
            );
        }

        if !found_any {
            return Dataset::not_found();
        }
        columns.push((ColumnSchema::row_id(), row_id.to_value()));

        let row: Row = column_order
            .iter()
            .filter_map(|wanted| {
                columns
                    .iter()
                    .find(|(column, _)| column == wanted)
                    .map(|(_, value)| value.clone())
            })
            .collect();
        Dataset::single(TableSchema::new(table, column_order.to_vec()), row)
    }
}

/// Scan fragments in index order; the first one holding the row wins
async fn first_match(
    proxy: &NodeProxy,
    table: &str,
    row_id: &RowId,
    fragment_count: usize,
) -> Option<Dataset> {
    for index in 0..fragment_count {
        let fragment = TableSchema::fragment_name(table, index);
        match proxy.scan_line_data(&fragment, row_id).await {
            Ok(dataset) if dataset.first_row().is_some() => return Some(dataset),
            Ok(_) => {}
            Err(e) => tracing::debug!("Scan of {} failed: {}", fragment, e),
        }
    }
    None
}
