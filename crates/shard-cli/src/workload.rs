//! Workload files driven by `shard run`

use anyhow::Result;
use serde::Deserialize;
use shard_core::{Row, ShardingSpec, TableSchema};
use std::path::Path;

/// Tables to build and fill, then pairs of tables to join
#[derive(Debug, Clone, Deserialize)]
pub struct Workload {
    pub tables: Vec<TableLoad>,
    #[serde(default)]
    pub joins: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableLoad {
    pub schema: TableSchema,
    pub sharding: ShardingSpec,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Workload {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_core::Value;

    const SAMPLE: &str = r#"{
        "tables": [
            {
                "schema": {
                    "table_name": "Person",
                    "columns": [
                        {"name": "name", "data_type": "Utf8"},
                        {"name": "age", "data_type": "Int32"}
                    ]
                },
                "sharding": {
                    "1": {"columns": ["age"]},
                    "0": {"columns": ["name"], "predicate": {"age": [{"op": ">", "val": 3}]}}
                },
                "rows": [["Alice", 30], ["Bob", null]]
            }
        ],
        "joins": [["Person", "Person"]]
    }"#;

    #[test]
    fn test_parse_workload() {
        let workload = Workload::from_json(SAMPLE).unwrap();
        assert_eq!(workload.tables.len(), 1);
        assert_eq!(workload.joins, vec![vec!["Person", "Person"]]);

        let person = &workload.tables[0];
        assert_eq!(person.schema.table_name, "Person");
        assert_eq!(person.rows[0], vec![Value::from("Alice"), Value::from(30i64)]);
        assert_eq!(person.rows[1][1], Value::Null);
    }

    #[test]
    fn test_sharding_keeps_document_order() {
        let workload = Workload::from_json(SAMPLE).unwrap();
        let keys: Vec<String> = workload.tables[0]
            .sharding
            .iter()
            .map(|(key, _)| key.to_string())
            .collect();
        assert_eq!(keys, vec!["1", "0"]);
    }

    #[test]
    fn test_missing_tables_rejected() {
        assert!(Workload::from_json(r#"{"joins": []}"#).is_err());
    }
}
