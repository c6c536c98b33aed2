//! Coordinator for the shard store
//!
//! A [`Cluster`] boots a fixed set of storage nodes on a simulated
//! [`Network`](shard_network::Network) and coordinates them:
//!
//! - **build**: split a table into fragments by a sharding spec and create
//!   each fragment on its replica nodes
//! - **write**: send every row to every fragment on every node; each fragment
//!   keeps it if its predicate accepts it
//! - **reconstruct**: reassemble a row from the fragments holding it
//! - **join**: natural join of two tables over their reconstructed rows
//!
//! # Example
//!
//! ```ignore
//! use shard_coordinator::{Cluster, ClusterClient, ClusterConfig};
//! use shard_network::{Network, NetworkConfig};
//!
//! let network = Network::new(NetworkConfig::default());
//! let cluster = Cluster::new(ClusterConfig::default(), &network)?;
//!
//! let client = ClusterClient::connect(&network, "client", cluster.name());
//! client.build_table(schema, &spec).await?;
//! client.fragment_write("Person", row).await?;
//! let joined = client.join(&["Person", "Pet"]).await?;
//! ```

pub mod catalog;
pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
mod fanout;
pub mod fragment;
pub mod join;
pub mod policy;
pub mod proxy;
mod reconstruct;
mod write;

pub use catalog::{TableCatalog, TableEntry};
pub use client::ClusterClient;
pub use cluster::Cluster;
pub use config::{ClusterConfig, DispatchMode, INTERNAL_END_PREFIX, NODE_NAME_PREFIX};
pub use error::{CoordinatorError, Result};
pub use fragment::{plan_fragments, FragmentPlan};
pub use join::JoinSchema;
pub use policy::{BuildPolicy, WritePolicy};
pub use proxy::NodeProxy;
