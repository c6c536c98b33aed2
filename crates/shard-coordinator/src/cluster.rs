//! Cluster bootstrap and the coordinator's RPC surface

use crate::catalog::TableCatalog;
use crate::config::{ClusterConfig, INTERNAL_END_PREFIX, NODE_NAME_PREFIX};
use crate::error::{CoordinatorError, Result};
use crate::proxy::NodeProxy;
use async_trait::async_trait;
use dashmap::DashMap;
use shard_core::{Dataset, Row, TableSchema};
use shard_network::{CoordinatorRpc, CoordinatorService, Network, NetworkError, NodeService, WeakNetwork};
use shard_node::StorageNode;
use std::collections::HashMap;
use std::sync::Arc;

/// Coordinator of a fixed set of storage nodes.
///
/// The coordinator owns the table catalog and reaches every node through an
/// internal client end named `InternalClient<node>`. Table builds, writes,
/// row reconstruction and joins live in their own modules as further
/// `impl Cluster` blocks.
pub struct Cluster {
    pub(crate) config: ClusterConfig,
    node_ids: Vec<String>,
    nodes: HashMap<String, Arc<StorageNode>>,
    proxies: DashMap<String, NodeProxy>,
    network: WeakNetwork,
    pub(crate) catalog: TableCatalog,
}

impl Cluster {
    /// Boot the storage nodes and register them and the coordinator on
    /// `network`
    pub fn new(config: ClusterConfig, network: &Network) -> Result<Arc<Self>> {
        config.validate()?;

        let node_ids = config.node_ids();
        let mut nodes = HashMap::new();
        let proxies = DashMap::new();

        for node_id in &node_ids {
            let node = Arc::new(StorageNode::new(node_id.clone()));
            network.add_server(node_id.clone(), Arc::new(NodeService::new(Arc::clone(&node))));
            nodes.insert(node_id.clone(), node);
            proxies.insert(node_id.clone(), Self::open_proxy(network, node_id));
        }

        let cluster = Arc::new(Self {
            config,
            node_ids,
            nodes,
            proxies,
            network: network.downgrade(),
            catalog: TableCatalog::new(),
        });

        network.add_server(
            cluster.config.name.clone(),
            Arc::new(CoordinatorService::new(Arc::clone(&cluster))),
        );

        tracing::info!(
            "Cluster {} started with {} nodes",
            cluster.config.name,
            cluster.node_ids.len()
        );
        Ok(cluster)
    }

    /// Create with default configuration
    pub fn with_defaults(network: &Network) -> Result<Arc<Self>> {
        Self::new(ClusterConfig::default(), network)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Node identifiers in node order
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    /// Direct handle on a storage node, bypassing the network
    pub fn node(&self, node_id: &str) -> Option<Arc<StorageNode>> {
        self.nodes.get(node_id).cloned()
    }

    pub fn catalog(&self) -> &TableCatalog {
        &self.catalog
    }

    /// Name of the end the coordinator uses to reach `node_id`
    pub fn internal_end_name(node_id: &str) -> String {
        format!("{}{}", INTERNAL_END_PREFIX, node_id)
    }

    /// Map a replica-key segment to a node identifier: a known identifier
    /// stands for itself, anything else gets the node prefix.
    pub(crate) fn resolve_node(&self, segment: &str) -> String {
        if self.node_ids.iter().any(|id| id == segment) {
            segment.to_string()
        } else {
            format!("{}{}", NODE_NAME_PREFIX, segment)
        }
    }

    /// Proxy for `node_id`, opening an end on first use. Ends are enabled
    /// once at creation, so a later `enable(end, false)` on the network
    /// keeps the node cut off.
    pub(crate) fn proxy(&self, node_id: &str) -> Result<NodeProxy> {
        if let Some(proxy) = self.proxies.get(node_id) {
            return Ok(proxy.value().clone());
        }
        let network = self
            .network
            .upgrade()
            .ok_or(CoordinatorError::NetworkError(NetworkError::Shutdown))?;
        let proxy = Self::open_proxy(&network, node_id);
        self.proxies.insert(node_id.to_string(), proxy.clone());
        Ok(proxy)
    }

    /// Proxies of the fixed node set, in node order
    pub(crate) fn node_proxies(&self) -> Vec<NodeProxy> {
        self.node_ids
            .iter()
            .filter_map(|node_id| self.proxy(node_id).ok())
            .collect()
    }

    fn open_proxy(network: &Network, node_id: &str) -> NodeProxy {
        let end_name = Self::internal_end_name(node_id);
        let end = network.make_end(end_name.as_str());
        network.connect(&end_name, node_id);
        network.enable(&end_name, true);
        NodeProxy::new(node_id, end)
    }

    /// Greet every node, then answer
    pub async fn say_hello(&self, visitor: &str) -> String {
        for proxy in self.node_proxies() {
            match proxy.say_hello(self.name()).await {
                Ok(greeting) => tracing::info!("{}", greeting),
                Err(e) => tracing::warn!("Node {} did not answer: {}", proxy.node_id(), e),
            }
        }
        format!("Hello {}, I am the coordinator of {}", visitor, self.name())
    }
}

#[async_trait]
impl CoordinatorRpc for Cluster {
    async fn say_hello(&self, visitor: String) -> String {
        Cluster::say_hello(self, &visitor).await
    }

    async fn build_table(&self, schema: TableSchema, sharding: Vec<u8>) -> String {
        Cluster::build_table(self, schema, &sharding).await
    }

    async fn fragment_write(&self, table: String, row: Row) -> String {
        Cluster::fragment_write(self, &table, row).await
    }

    async fn join(&self, tables: Vec<String>) -> Dataset {
        Cluster::join(self, &tables).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_network::NetworkConfig;

    fn network() -> Network {
        Network::new(NetworkConfig::reliable())
    }

    #[tokio::test]
    async fn test_bootstrap_registers_servers_and_ends() {
        let network = network();
        let cluster = Cluster::new(ClusterConfig::new("Cluster", 2), &network).unwrap();

        assert_eq!(cluster.node_ids(), ["Node0", "Node1"]);
        assert!(network.has_server("Node0"));
        assert!(network.has_server("Node1"));
        assert!(network.has_server("Cluster"));
        assert!(cluster.node("Node1").is_some());
        assert!(cluster.node("Node2").is_none());
        assert_eq!(Cluster::internal_end_name("Node0"), "InternalClientNode0");
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let network = network();
        assert!(matches!(
            Cluster::new(ClusterConfig::new("Node0", 2), &network),
            Err(CoordinatorError::ConfigError(_))
        ));
        assert!(!network.has_server("Node0"));
    }

    #[tokio::test]
    async fn test_resolve_node() {
        let network = network();
        let cluster = Cluster::with_defaults(&network).unwrap();

        assert_eq!(cluster.resolve_node("Node2"), "Node2");
        assert_eq!(cluster.resolve_node("1"), "Node1");
        assert_eq!(cluster.resolve_node("7"), "Node7");
    }

    #[tokio::test]
    async fn test_say_hello_reaches_nodes() {
        let network = network();
        let cluster = Cluster::with_defaults(&network).unwrap();

        let greeting = cluster.say_hello("tester").await;
        assert_eq!(greeting, "Hello tester, I am the coordinator of Cluster");
        for node in cluster.node_ids() {
            assert_eq!(network.rpc_count(node), 1);
        }
    }

    #[tokio::test]
    async fn test_unknown_node_gets_lazy_proxy() {
        let network = network();
        let cluster = Cluster::with_defaults(&network).unwrap();

        let proxy = cluster.proxy("Node9").unwrap();
        assert_eq!(proxy.node_id(), "Node9");
        assert!(proxy.say_hello("tester").await.is_err());
    }
}
