use crate::error::{Result, ShardError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float32,
    Float64,
    Utf8,
}

impl DataType {
    /// Whether a value may be stored in a column of this type. `Null` fits anywhere.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (DataType::Boolean, Value::Bool(_)) => true,
            (DataType::Int32, Value::Int(v)) => i32::try_from(*v).is_ok(),
            (DataType::Int64, Value::Int(_)) => true,
            (DataType::Float32 | DataType::Float64, Value::Float(_) | Value::Int(_)) => true,
            (DataType::Utf8, Value::Str(_)) => true,
            _ => false,
        }
    }

    /// Bring an accepted value to the column's representation: integers
    /// stored in float columns become floats.
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (DataType::Float32 | DataType::Float64, Value::Int(v)) => Value::Float(v as f64),
            (_, value) => value,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int32 => "INT",
            DataType::Int64 => "BIGINT",
            DataType::Float32 => "FLOAT",
            DataType::Float64 => "DOUBLE",
            DataType::Utf8 => "VARCHAR",
        };
        f.write_str(name)
    }
}

/// A single cell. Serialized untagged so plain JSON scalars decode directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Ordering between comparable values. Integers and floats compare
    /// numerically; any other cross-type pair (and `Null`) is incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => f.write_str(v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Globally unique identity assigned to a row when it is first written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(pub Uuid);

impl RowId {
    /// Create a new random row ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ShardError::InvalidRowId(s.to_string()))
    }

    /// The value stored in a fragment's `id` column
    pub fn to_value(&self) -> Value {
        Value::Str(self.0.to_string())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int_into_float_column() {
        assert_eq!(DataType::Float64.coerce(Value::Int(30)), Value::Float(30.0));
        assert_eq!(DataType::Float32.coerce(Value::Int(-2)), Value::Float(-2.0));
        assert_eq!(DataType::Int64.coerce(Value::Int(30)), Value::Int(30));
        assert_eq!(DataType::Float64.coerce(Value::Null), Value::Null);
        assert_eq!(DataType::Float64.coerce(Value::Float(1.5)), Value::Float(1.5));
    }

    #[test]
    fn test_value_untagged_json() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 30, 2.5, "Alice"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(30),
                Value::Float(2.5),
                Value::Str("Alice".into()),
            ]
        );
    }

    #[test]
    fn test_value_compare() {
        assert_eq!(Value::Int(3).compare(&Value::Float(2.5)), Some(Ordering::Greater));
        assert_eq!(Value::from("a").compare(&Value::from("b")), Some(Ordering::Less));
        assert_eq!(Value::Int(1).compare(&Value::from("1")), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn test_data_type_accepts() {
        assert!(DataType::Int32.accepts(&Value::Int(30)));
        assert!(!DataType::Int32.accepts(&Value::Int(i64::MAX)));
        assert!(DataType::Float64.accepts(&Value::Int(3)));
        assert!(DataType::Utf8.accepts(&Value::Null));
        assert!(!DataType::Utf8.accepts(&Value::Bool(false)));
    }

    #[test]
    fn test_row_id_round_trip_through_value() {
        let id = RowId::new();
        let value = id.to_value();
        assert_eq!(RowId::parse(value.as_str().unwrap()).unwrap(), id);
        assert!(RowId::parse("not-a-uuid").is_err());
    }
}
