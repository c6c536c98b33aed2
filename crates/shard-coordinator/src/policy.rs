//! Consistency policies for writes and table builds
//!
//! Both policies are deliberately weak: a write counts as done once any
//! single fragment replica accepts it, and a failed build leaves whatever
//! fragments it already created in place.

use serde::{Deserialize, Serialize};
use shard_core::status;

/// How write acknowledgements are combined into one outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WritePolicy {
    /// Success as soon as one node/fragment pair accepted the row. Rejections
    /// elsewhere are neither reported nor rolled back.
    #[default]
    AtLeastOneAck,
}

impl WritePolicy {
    pub fn settle<I: IntoIterator<Item = bool>>(&self, acks: I) -> bool {
        match self {
            WritePolicy::AtLeastOneAck => acks.into_iter().any(|ack| ack),
        }
    }
}

/// What a table build does when a replica refuses its fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildPolicy {
    /// Stop at the first refusal and return it. Fragments already created
    /// stay where they are.
    #[default]
    AbortNoRollback,
}

impl BuildPolicy {
    pub fn should_abort(&self, reply: &str) -> bool {
        match self {
            BuildPolicy::AbortNoRollback => !status::is_success(reply),
        }
    }
}
