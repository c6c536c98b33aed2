//! Sharding rules: which columns a fragment holds, which rows it accepts and
//! which nodes replicate it.

use crate::error::{Result, ShardError};
use crate::schema::{Row, TableSchema};
use crate::types::Value;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

const REPLICA_SEPARATOR: &str = "|";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==", alias = "=")]
    Eq,
    #[serde(rename = "!=", alias = "<>")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
}

impl CompareOp {
    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::NotEq => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::LtEq => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::GtEq => ordering != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub op: CompareOp,
    #[serde(alias = "val")]
    pub value: Value,
}

impl Condition {
    pub fn new(op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            op,
            value: value.into(),
        }
    }

    /// Incomparable operands never satisfy a condition
    pub fn holds(&self, candidate: &Value) -> bool {
        candidate
            .compare(&self.value)
            .map(|ordering| self.op.holds(ordering))
            .unwrap_or(false)
    }
}

/// Row filter evaluated by storage nodes: every condition on every listed
/// column must hold. The empty predicate accepts all rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(pub BTreeMap<String, Vec<Condition>>);

impl Predicate {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, condition: Condition) -> Self {
        self.0.entry(column.into()).or_default().push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluate against a row laid out by `schema`. A condition naming a
    /// column the schema lacks rejects the row.
    pub fn evaluate(&self, schema: &TableSchema, row: &Row) -> bool {
        self.0.iter().all(|(column, conditions)| {
            match schema.index_of(column).ok().and_then(|i| row.get(i)) {
                Some(value) => conditions.iter().all(|c| c.holds(value)),
                None => false,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rule {
    #[serde(alias = "column")]
    pub columns: Vec<String>,
    #[serde(default)]
    pub predicate: Predicate,
}

impl Rule {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            predicate: Predicate::none(),
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }
}

/// The set of nodes a fragment is replicated on, e.g. `"0|2"` or `"Node1"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplicaKey(pub String);

impl ReplicaKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_nodes<S: AsRef<str>>(nodes: &[S]) -> Self {
        let parts: Vec<&str> = nodes.iter().map(AsRef::as_ref).collect();
        Self(parts.join(REPLICA_SEPARATOR))
    }

    /// Individual node segments, in key order. Empty segments are skipped.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0
            .split(REPLICA_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl fmt::Display for ReplicaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered mapping from replica key to rule. Position `i` becomes fragment
/// `i` of the table, so order is preserved from the source document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShardingSpec {
    rules: Vec<(ReplicaKey, Rule)>,
}

impl ShardingSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, key: impl Into<String>, rule: Rule) -> Self {
        self.rules.push((ReplicaKey::new(key), rule));
        self
    }

    /// Decode a JSON object payload, keeping document order
    pub fn from_json(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).map_err(|e| ShardError::InvalidShardingSpec(e.to_string()))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ReplicaKey, Rule)> {
        self.rules.iter()
    }
}

impl Serialize for ShardingSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for (key, rule) in &self.rules {
            map.serialize_entry(key, rule)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ShardingSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SpecVisitor;

        impl<'de> Visitor<'de> for SpecVisitor {
            type Value = ShardingSpec;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping replica keys to rules")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<ShardingSpec, A::Error> {
                let mut rules = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, rule)) = access.next_entry::<ReplicaKey, Rule>()? {
                    rules.push((key, rule));
                }
                Ok(ShardingSpec { rules })
            }
        }

        deserializer.deserialize_map(SpecVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSchema;
    use crate::types::DataType;

    #[test]
    fn test_spec_keeps_document_order() {
        let payload = br#"{
            "2|1": {"column": ["age"]},
            "0": {"column": ["name"], "predicate": {"age": [{"op": ">", "val": 18}]}},
            "Node1": {"columns": ["name", "age"]}
        }"#;
        let spec = ShardingSpec::from_json(payload).unwrap();
        let keys: Vec<&str> = spec.iter().map(|(k, _)| k.0.as_str()).collect();
        assert_eq!(keys, vec!["2|1", "0", "Node1"]);

        let (_, second) = spec.iter().nth(1).unwrap();
        assert_eq!(second.columns, vec!["name"]);
        assert_eq!(
            second.predicate,
            Predicate::none().with("age", Condition::new(CompareOp::Gt, 18))
        );
    }

    #[test]
    fn test_spec_json_round_trip_preserves_order() {
        let spec = ShardingSpec::new()
            .rule("1", Rule::new(["b"]))
            .rule("0", Rule::new(["a"]));
        let decoded = ShardingSpec::from_json(&spec.to_json().unwrap()).unwrap();
        assert_eq!(decoded, spec);
    }

    #[test]
    fn test_malformed_spec() {
        assert!(ShardingSpec::from_json(b"[1, 2]").is_err());
        assert!(ShardingSpec::from_json(b"{\"0\": {\"predicate\": {}}}").is_err());
    }

    #[test]
    fn test_replica_key_segments() {
        let key = ReplicaKey::new("0| 2||Node3");
        assert_eq!(key.segments().collect::<Vec<_>>(), vec!["0", "2", "Node3"]);
        assert_eq!(ReplicaKey::from_nodes(&["Node0", "Node1"]).0, "Node0|Node1");
    }

    #[test]
    fn test_predicate_evaluation() {
        let schema = TableSchema::new(
            "Person",
            vec![
                ColumnSchema::new("name", DataType::Utf8),
                ColumnSchema::new("age", DataType::Int32),
            ],
        );
        let adult = Predicate::none()
            .with("age", Condition::new(CompareOp::GtEq, 18))
            .with("age", Condition::new(CompareOp::Lt, 65));

        assert!(adult.evaluate(&schema, &vec!["Alice".into(), Value::Int(30)]));
        assert!(!adult.evaluate(&schema, &vec!["Bob".into(), Value::Int(12)]));
        assert!(!adult.evaluate(&schema, &vec!["Carol".into(), Value::Null]));
        assert!(Predicate::none().evaluate(&schema, &vec![]));

        let unknown = Predicate::none().with("height", Condition::new(CompareOp::Gt, 1));
        assert!(!unknown.evaluate(&schema, &vec!["Alice".into(), Value::Int(30)]));
    }
}
