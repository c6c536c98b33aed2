//! Simulated network for the shard store
//!
//! Storage nodes and the coordinator register as servers on a [`Network`];
//! callers reach them through named [`ClientEnd`]s. Every message is
//! serialized onto the wire and may be delayed, dropped or lost according to
//! the network's [`FaultConfig`], so callers see the same failure modes a
//! real deployment would.
//!
//! # Example
//!
//! ```ignore
//! use shard_network::{Network, NetworkConfig, NodeService, Request};
//! use std::sync::Arc;
//!
//! let network = Network::new(NetworkConfig::default());
//! network.add_server("Node0", Arc::new(NodeService::new(node)));
//!
//! let end = network.make_end("client-Node0");
//! network.connect("client-Node0", "Node0");
//! network.enable("client-Node0", true);
//!
//! let reply = end.call(Request::SayHello { visitor: "me".into() }).await?;
//! ```
//!
//! # Modules
//!
//! - [`network`]: ends, servers and call delivery
//! - [`fault`]: fault injection settings
//! - [`message`]: request/response types and wire encoding
//! - [`service`]: server-side dispatch traits

pub mod error;
pub mod fault;
pub mod message;
pub mod network;
pub mod service;

pub use error::{NetworkError, Result};
pub use fault::FaultConfig;
pub use message::{Request, Response, WireMessage};
pub use network::{ClientEnd, Network, NetworkConfig, WeakNetwork};
pub use service::{CoordinatorRpc, CoordinatorService, NodeRpc, NodeService, Service};
