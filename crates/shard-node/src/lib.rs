//! Storage node for the shard store
//!
//! A node keeps table fragments in memory and answers the coordinator's
//! [`NodeRpc`](shard_network::NodeRpc) calls: fragment creation, row
//! insertion filtered by the fragment's predicate, row scans by identity and
//! schema lookups.

pub mod fragment;
pub mod node;

pub use fragment::LocalFragment;
pub use node::StorageNode;
