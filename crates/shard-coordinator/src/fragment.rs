//! Fragmentation engine: splitting a table into replicated fragments

use crate::cluster::Cluster;
use crate::error::{CoordinatorError, Result};
use shard_core::status::{self, OK};
use shard_core::{ColumnSchema, Predicate, ShardingSpec, TableSchema};

/// Where and how one fragment of a table is created
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentPlan {
    pub index: usize,
    /// `id` followed by the rule's columns, in full-schema order
    pub schema: TableSchema,
    pub predicate: Predicate,
    /// Node identifiers, in replica-key order
    pub replicas: Vec<String>,
}

impl FragmentPlan {
    pub fn name(&self) -> &str {
        &self.schema.table_name
    }
}

/// Plan one fragment per rule of `spec`.
///
/// `full_schema` must already carry the row id column. Rule columns that do
/// not exist in the table are skipped, as is an explicit `id`.
pub fn plan_fragments<F>(full_schema: &TableSchema, spec: &ShardingSpec, resolve: F) -> Vec<FragmentPlan>
where
    F: Fn(&str) -> String,
{
    spec.iter()
        .enumerate()
        .map(|(index, (key, rule))| {
            let mut columns = vec![ColumnSchema::row_id()];
            columns.extend(
                full_schema
                    .columns
                    .iter()
                    .filter(|c| !c.is_row_id() && rule.columns.contains(&c.name))
                    .cloned(),
            );
            FragmentPlan {
                index,
                schema: TableSchema::new(
                    TableSchema::fragment_name(&full_schema.table_name, index),
                    columns,
                ),
                predicate: rule.predicate.clone(),
                replicas: key.segments().map(&resolve).collect(),
            }
        })
        .collect()
}

impl Cluster {
    /// Build `schema` as fragments described by a JSON sharding payload.
    /// Returns a status string; `'0'` first means every fragment was created.
    pub async fn build_table(&self, schema: TableSchema, sharding: &[u8]) -> String {
        match ShardingSpec::from_json(sharding) {
            Ok(spec) => self.build_table_with_spec(schema, &spec).await,
            Err(e) => {
                tracing::warn!("Rejected sharding spec for {}: {}", schema.table_name, e);
                status::failure(format!("Invalid Sharding Spec: {}", e))
            }
        }
    }

    pub async fn build_table_with_spec(&self, schema: TableSchema, spec: &ShardingSpec) -> String {
        let table = schema.table_name.clone();
        match self.try_build_table(schema, spec).await {
            Ok(()) => OK.to_string(),
            Err(CoordinatorError::Rejected { node, status, .. }) => {
                tracing::warn!("Building {} stopped, {} replied {}", table, node, status);
                status
            }
            Err(e) => {
                tracing::warn!("Building {} failed: {}", table, e);
                status::failure(format!("Create Failed: {}", e))
            }
        }
    }

    async fn try_build_table(&self, schema: TableSchema, spec: &ShardingSpec) -> Result<()> {
        let full_schema = schema.with_row_id();
        self.catalog.register(&full_schema.table_name, spec.len());

        let plans = plan_fragments(&full_schema, spec, |segment| self.resolve_node(segment));
        tracing::info!(
            "Building table {} as {} fragments",
            full_schema.table_name,
            plans.len()
        );

        for plan in &plans {
            for node in &plan.replicas {
                let proxy = self.proxy(node)?;
                let reply = proxy
                    .create_table(&plan.schema, &plan.predicate, &full_schema)
                    .await?;
                if self.config.build_policy.should_abort(&reply) {
                    return Err(CoordinatorError::Rejected {
                        node: node.clone(),
                        method: "RPCCreateTable",
                        status: reply,
                    });
                }
                tracing::debug!("Created {} on {}", plan.name(), node);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_core::{CompareOp, Condition, DataType, Rule};

    fn person() -> TableSchema {
        TableSchema::new(
            "Person",
            vec![
                ColumnSchema::new("name", DataType::Utf8),
                ColumnSchema::new("age", DataType::Int32),
                ColumnSchema::new("city", DataType::Utf8),
            ],
        )
        .with_row_id()
    }

    fn prefixed(segment: &str) -> String {
        format!("Node{}", segment)
    }

    #[test]
    fn test_plan_follows_full_schema_order() {
        let spec = ShardingSpec::new().rule("0|1", Rule::new(["city", "name"]));
        let plans = plan_fragments(&person(), &spec, prefixed);

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name(), "Person|0");
        let names: Vec<&str> = plans[0].schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "city"]);
        assert_eq!(plans[0].replicas, vec!["Node0", "Node1"]);
    }

    #[test]
    fn test_plan_skips_unknown_and_id_columns() {
        let spec = ShardingSpec::new()
            .rule("0", Rule::new(["age", "salary", "id"]))
            .rule("2", Rule::new(Vec::<String>::new()));
        let plans = plan_fragments(&person(), &spec, prefixed);

        assert_eq!(plans[0].schema.columns.len(), 2);
        assert_eq!(plans[0].schema.columns[1].name, "age");
        assert_eq!(plans[1].name(), "Person|1");
        assert_eq!(plans[1].schema.columns, vec![ColumnSchema::row_id()]);
        assert_eq!(plans[1].replicas, vec!["Node2"]);
    }

    #[test]
    fn test_plan_carries_predicate() {
        let predicate = Predicate::none().with("age", Condition::new(CompareOp::GtEq, 18));
        let spec = ShardingSpec::new()
            .rule("0", Rule::new(["name"]).with_predicate(predicate.clone()));
        let plans = plan_fragments(&person(), &spec, prefixed);

        assert_eq!(plans[0].predicate, predicate);
        assert_eq!(plans[0].index, 0);
    }
}
