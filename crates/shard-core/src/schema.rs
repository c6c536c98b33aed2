use crate::error::{Result, ShardError};
use crate::types::{DataType, Value};
use serde::{Deserialize, Serialize};

/// Name of the synthetic row identity column carried by every fragment
pub const ROW_ID_COLUMN: &str = "id";

const FRAGMENT_SEPARATOR: char = '|';

/// Values positionally aligned with a schema's columns
pub type Row = Vec<Value>;

/// A named, typed column. Two columns are the same column when both name and
/// type match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// The synthetic `id` column
    pub fn row_id() -> Self {
        Self::new(ROW_ID_COLUMN, DataType::Utf8)
    }

    pub fn is_row_id(&self) -> bool {
        *self == Self::row_id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnSchema>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
        }
    }

    /// Qualified name of fragment `index` of `table`, e.g. `Person|0`
    pub fn fragment_name(table: &str, index: usize) -> String {
        format!("{}{}{}", table, FRAGMENT_SEPARATOR, index)
    }

    /// Split a qualified fragment name back into table name and index
    pub fn parse_fragment_name(name: &str) -> Result<(&str, usize)> {
        let (table, index) = name
            .rsplit_once(FRAGMENT_SEPARATOR)
            .ok_or_else(|| ShardError::InvalidFragmentName(name.to_string()))?;
        let index = index
            .parse()
            .map_err(|_| ShardError::InvalidFragmentName(name.to_string()))?;
        Ok((table, index))
    }

    /// Copy of this schema with the `id` column appended, the layout of an
    /// augmented row (`values ++ [id]`).
    pub fn with_row_id(&self) -> Self {
        let mut schema = self.clone();
        if !schema.columns.iter().any(ColumnSchema::is_row_id) {
            schema.columns.push(ColumnSchema::row_id());
        }
        schema
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ShardError::ColumnNotFound(name.to_string()))
    }

    pub fn position(&self, column: &ColumnSchema) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// The unit exchanged for schema and scan queries.
///
/// A dataset whose schema carries an empty table name is the "not found"
/// sentinel returned by scans and reconstructions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub schema: TableSchema,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(schema: TableSchema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    pub fn single(schema: TableSchema, row: Row) -> Self {
        Self::new(schema, vec![row])
    }

    /// The "not found" sentinel
    pub fn not_found() -> Self {
        Self::default()
    }

    pub fn is_not_found(&self) -> bool {
        self.schema.table_name.is_empty()
    }

    /// First row, provided the dataset names a table and the row is non-empty
    pub fn first_row(&self) -> Option<&Row> {
        if self.is_not_found() {
            return None;
        }
        self.rows.first().filter(|row| !row.is_empty())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }
}
