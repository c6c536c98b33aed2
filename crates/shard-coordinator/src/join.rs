//! Distributed natural join of two fragmented tables

use crate::cluster::Cluster;
use crate::fanout::fan_out;
use crate::proxy::NodeProxy;
use shard_core::{ColumnSchema, Dataset, Row, RowId, TableSchema};
use std::cmp::Ordering;

/// Output layout of a natural join and the positions its keys sit at
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinSchema {
    /// Left columns, then right columns without an equal left column
    pub columns: Vec<ColumnSchema>,
    /// Position of each shared column in the left table
    pub left_keys: Vec<usize>,
    /// Position of the same column in the right table
    pub right_keys: Vec<usize>,
    /// Right positions that are appended to a matched left row
    right_rest: Vec<usize>,
}

impl JoinSchema {
    /// Columns are shared when name and type are both equal
    pub fn new(left: &[ColumnSchema], right: &[ColumnSchema]) -> Self {
        let mut schema = Self {
            columns: left.to_vec(),
            ..Default::default()
        };
        for (l, column) in left.iter().enumerate() {
            if let Some(r) = right.iter().position(|c| c == column) {
                schema.left_keys.push(l);
                schema.right_keys.push(r);
            }
        }
        for (r, column) in right.iter().enumerate() {
            if !left.contains(column) {
                schema.columns.push(column.clone());
                schema.right_rest.push(r);
            }
        }
        schema
    }

    pub fn has_keys(&self) -> bool {
        !self.left_keys.is_empty()
    }

    pub fn matches(&self, left: &Row, right: &Row) -> bool {
        self.left_keys
            .iter()
            .zip(&self.right_keys)
            .all(|(&l, &r)| match (left.get(l), right.get(r)) {
                (Some(a), Some(b)) => a == b || a.compare(b) == Some(Ordering::Equal),
                _ => false,
            })
    }

    /// Left row followed by the right row's non-key values
    pub fn merge(&self, left: &Row, right: &Row) -> Row {
        let mut row = left.clone();
        row.extend(self.right_rest.iter().filter_map(|&r| right.get(r).cloned()));
        row
    }
}

impl Cluster {
    /// Natural join of the first two `tables`; further names are ignored.
    ///
    /// Fewer than two names or a table that was never built gives an empty
    /// dataset. Tables without shared columns give the combined schema and
    /// no rows.
    pub async fn join(&self, tables: &[String]) -> Dataset {
        let [left, right, ..] = tables else {
            tracing::warn!("Join needs two tables, got {}", tables.len());
            return Dataset::default();
        };
        let (Some(left_ids), Some(right_ids)) =
            (self.catalog.row_ids(left), self.catalog.row_ids(right))
        else {
            tracing::warn!("Join of unknown table among {} and {}", left, right);
            return Dataset::default();
        };

        let left_columns = self.fetch_columns(left).await;
        let right_columns = self.fetch_columns(right).await;
        if left_columns.is_empty() || right_columns.is_empty() {
            tracing::warn!("No columns found for {} or {}", left, right);
            return Dataset::default();
        }

        let schema = JoinSchema::new(&left_columns, &right_columns);
        let mut result = Dataset::new(TableSchema::new("", schema.columns.clone()), Vec::new());
        if !schema.has_keys() {
            tracing::debug!("{} and {} share no columns", left, right);
            return result;
        }

        let left_rows = self.reconstruct_all(left, &left_ids, &left_columns).await;
        let right_rows = self.reconstruct_all(right, &right_ids, &right_columns).await;

        for l in &left_rows {
            for r in &right_rows {
                if schema.matches(l, r) {
                    result.rows.push(schema.merge(l, r));
                }
            }
        }

        tracing::info!(
            "Joined {} ({} rows) with {} ({} rows): {} rows",
            left,
            left_rows.len(),
            right,
            right_rows.len(),
            result.rows.len()
        );
        result
    }

    /// Logical columns of `table`: the union of its fragments' columns in
    /// fragment order, without the row id
    async fn fetch_columns(&self, table: &str) -> Vec<ColumnSchema> {
        let fragment_count = self.catalog.fragment_count(table).unwrap_or(0);
        let proxies = self.node_proxies();
        let proxies = &proxies;
        let per_fragment = fan_out(self.config.dispatch, 0..fragment_count, |index| async move {
            first_schema(proxies, &TableSchema::fragment_name(table, index)).await
        })
        .await;

        let mut columns: Vec<ColumnSchema> = Vec::new();
        for column in per_fragment.into_iter().flatten().flatten() {
            if !column.is_row_id() && !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }

    /// Reconstruct every row in `ids`, keeping only complete ones
    async fn reconstruct_all(&self, table: &str, ids: &[RowId], columns: &[ColumnSchema]) -> Vec<Row> {
        let datasets = fan_out(self.config.dispatch, ids.iter().copied(), |row_id| async move {
            self.reconstruct_row(table, &row_id, columns).await
        })
        .await;

        let mut rows = Vec::with_capacity(datasets.len());
        for dataset in datasets {
            match dataset.first_row() {
                Some(row) if row.len() == columns.len() => rows.push(row.clone()),
                Some(row) => tracing::debug!(
                    "Skipping incomplete row of {} ({} of {} columns)",
                    table,
                    row.len(),
                    columns.len()
                ),
                None => {}
            }
        }
        rows
    }
}

/// Ask nodes in order for a fragment's columns; the first non-empty answer wins
async fn first_schema(proxies: &[NodeProxy], fragment: &str) -> Option<Vec<ColumnSchema>> {
    for proxy in proxies {
        match proxy.get_full_schema(fragment).await {
            Ok(Some(columns)) if !columns.is_empty() => return Some(columns),
            Ok(_) => {}
            Err(e) => tracing::debug!("Schema lookup of {} failed: {}", fragment, e),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_core::{DataType, Value};

    fn col(name: &str, data_type: DataType) -> ColumnSchema {
        ColumnSchema::new(name, data_type)
    }

    #[test]
    fn test_join_schema_keys_and_columns() {
        let person = vec![col("name", DataType::Utf8), col("ownerId", DataType::Int64)];
        let pet = vec![
            col("ownerId", DataType::Int64),
            col("species", DataType::Utf8),
        ];
        let schema = JoinSchema::new(&person, &pet);

        let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "ownerId", "species"]);
        assert_eq!(schema.left_keys, vec![1]);
        assert_eq!(schema.right_keys, vec![0]);
        assert!(schema.has_keys());
    }

    #[test]
    fn test_same_name_different_type_is_not_shared() {
        let left = vec![col("id", DataType::Int32)];
        let right = vec![col("id", DataType::Utf8)];
        let schema = JoinSchema::new(&left, &right);

        assert!(!schema.has_keys());
        assert_eq!(schema.columns.len(), 2);
    }

    #[test]
    fn test_matches_and_merge() {
        let person = vec![col("name", DataType::Utf8), col("ownerId", DataType::Int64)];
        let pet = vec![
            col("species", DataType::Utf8),
            col("ownerId", DataType::Int64),
        ];
        let schema = JoinSchema::new(&person, &pet);

        let alice: Row = vec![Value::from("Alice"), Value::from(1i64)];
        let cat: Row = vec![Value::from("cat"), Value::from(1i64)];
        let dog: Row = vec![Value::from("dog"), Value::from(2i64)];

        assert!(schema.matches(&alice, &cat));
        assert!(!schema.matches(&alice, &dog));
        assert_eq!(
            schema.merge(&alice, &cat),
            vec![Value::from("Alice"), Value::from(1i64), Value::from("cat")]
        );
    }

    #[test]
    fn test_numeric_keys_match_across_representations() {
        let left = vec![col("score", DataType::Float64)];
        let right = vec![col("score", DataType::Float64), col("tag", DataType::Utf8)];
        let schema = JoinSchema::new(&left, &right);

        let int_key: Row = vec![Value::Int(30)];
        let float_key: Row = vec![Value::Float(30.0), Value::from("b")];
        let other: Row = vec![Value::Float(30.5), Value::from("c")];
        assert!(schema.matches(&int_key, &float_key));
        assert!(!schema.matches(&int_key, &other));
    }

    #[test]
    fn test_short_row_never_matches() {
        let columns = vec![col("a", DataType::Int64), col("b", DataType::Int64)];
        let schema = JoinSchema::new(&columns, &columns);

        let full: Row = vec![Value::from(1i64), Value::from(2i64)];
        let short: Row = vec![Value::from(1i64)];
        assert!(!schema.matches(&full, &short));
    }
}
