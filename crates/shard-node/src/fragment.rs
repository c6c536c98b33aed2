//! A fragment held in a node's memory

use shard_core::{Predicate, Row, ShardError, TableSchema, Value, ROW_ID_COLUMN};
use std::collections::HashMap;

/// Why a row was refused by a fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    RowLengthMismatch { expected: usize, found: usize },
    TypeMismatch(String),
    PredicateNotSatisfied,
    MissingRowId,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::RowLengthMismatch { expected, found } => {
                write!(f, "Row Length Mismatch: expected {}, found {}", expected, found)
            }
            Rejection::TypeMismatch(column) => write!(f, "Type Mismatch on column {}", column),
            Rejection::PredicateNotSatisfied => f.write_str("Predicate Not Satisfied"),
            Rejection::MissingRowId => f.write_str("Missing Row Id"),
        }
    }
}

/// Column slice of a table stored on one node.
///
/// Rows arrive laid out by the full schema and are stored projected onto the
/// fragment schema, whose column 0 is the row identity.
#[derive(Debug, Clone)]
pub struct LocalFragment {
    schema: TableSchema,
    full_schema: TableSchema,
    predicate: Predicate,
    /// Full-schema position of each fragment column
    projection: Vec<usize>,
    rows: Vec<Row>,
    /// Row identity -> position in `rows`
    by_id: HashMap<String, usize>,
}

impl LocalFragment {
    /// Fails when the fragment names a column the full schema lacks, or when
    /// its first column is not the row identity.
    pub fn new(
        schema: TableSchema,
        predicate: Predicate,
        full_schema: TableSchema,
    ) -> shard_core::Result<Self> {
        match schema.columns.first() {
            Some(first) if first.is_row_id() => {}
            _ => {
                return Err(ShardError::SchemaError(format!(
                    "fragment {} must start with column '{}'",
                    schema.table_name, ROW_ID_COLUMN
                )))
            }
        }

        let projection = schema
            .columns
            .iter()
            .map(|column| {
                full_schema
                    .position(column)
                    .ok_or_else(|| ShardError::ColumnNotFound(column.name.clone()))
            })
            .collect::<shard_core::Result<Vec<_>>>()?;

        Ok(Self {
            schema,
            full_schema,
            predicate,
            projection,
            rows: Vec::new(),
            by_id: HashMap::new(),
        })
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn full_schema(&self) -> &TableSchema {
        &self.full_schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Validate, filter and store a full-layout row. Re-inserting an
    /// identity replaces the stored row.
    pub fn insert(&mut self, row: &Row) -> Result<(), Rejection> {
        if row.len() != self.full_schema.len() {
            return Err(Rejection::RowLengthMismatch {
                expected: self.full_schema.len(),
                found: row.len(),
            });
        }
        if let Some(column) = self
            .full_schema
            .columns
            .iter()
            .zip(row)
            .find(|(column, value)| !column.data_type.accepts(value))
            .map(|(column, _)| column)
        {
            return Err(Rejection::TypeMismatch(column.name.clone()));
        }
        if !self.predicate.evaluate(&self.full_schema, row) {
            return Err(Rejection::PredicateNotSatisfied);
        }

        let projected: Row = self
            .projection
            .iter()
            .map(|&i| self.full_schema.columns[i].data_type.coerce(row[i].clone()))
            .collect();
        let id = match projected.first() {
            Some(Value::Str(id)) => id.clone(),
            _ => return Err(Rejection::MissingRowId),
        };

        match self.by_id.get(&id) {
            Some(&pos) => self.rows[pos] = projected,
            None => {
                self.by_id.insert(id, self.rows.len());
                self.rows.push(projected);
            }
        }
        Ok(())
    }

    pub fn get(&self, row_id: &str) -> Option<&Row> {
        self.by_id.get(row_id).map(|&pos| &self.rows[pos])
    }
}
