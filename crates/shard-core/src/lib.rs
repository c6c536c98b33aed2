pub mod error;
pub mod rule;
pub mod schema;
pub mod status;
pub mod types;

pub use error::{Result, ShardError};
pub use rule::{CompareOp, Condition, Predicate, ReplicaKey, Rule, ShardingSpec};
pub use schema::{ColumnSchema, Dataset, Row, TableSchema, ROW_ID_COLUMN};
pub use types::*;
