//! Cluster configuration

use crate::error::{CoordinatorError, Result};
use crate::policy::{BuildPolicy, WritePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storage node identifiers are this prefix followed by an index
pub const NODE_NAME_PREFIX: &str = "Node";

/// Coordinator-to-node ends are this prefix followed by the node identifier
pub const INTERNAL_END_PREFIX: &str = "InternalClient";

/// How the coordinator issues independent per-node calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DispatchMode {
    /// One call at a time, in node order
    Sequential,
    /// All calls in flight at once; results are still combined in node order
    #[default]
    Concurrent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Name the coordinator is registered under on the network
    pub name: String,
    /// Number of storage nodes, named `Node0` through `Node{n-1}`
    pub node_count: usize,
    pub dispatch: DispatchMode,
    pub write_policy: WritePolicy,
    pub build_policy: BuildPolicy,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: "Cluster".to_string(),
            node_count: 3,
            dispatch: DispatchMode::default(),
            write_policy: WritePolicy::default(),
            build_policy: BuildPolicy::default(),
        }
    }
}

impl ClusterConfig {
    pub fn new(name: impl Into<String>, node_count: usize) -> Self {
        Self {
            name: name.into(),
            node_count,
            ..Default::default()
        }
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_count == 0 {
            return Err(CoordinatorError::ConfigError(
                "a cluster needs at least one node".to_string(),
            ));
        }
        if self.name.is_empty() {
            return Err(CoordinatorError::ConfigError(
                "cluster name must not be empty".to_string(),
            ));
        }
        if self.node_ids().contains(&self.name) || self.name.starts_with(INTERNAL_END_PREFIX) {
            return Err(CoordinatorError::ConfigError(format!(
                "cluster name {} collides with a node or end name",
                self.name
            )));
        }
        Ok(())
    }

    pub fn node_ids(&self) -> Vec<String> {
        (0..self.node_count)
            .map(|i| format!("{}{}", NODE_NAME_PREFIX, i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClusterConfig::default();
        assert_eq!(config.name, "Cluster");
        assert_eq!(config.node_ids(), vec!["Node0", "Node1", "Node2"]);
        assert_eq!(config.dispatch, DispatchMode::Concurrent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClusterConfig =
            serde_json::from_str(r#"{"node_count": 5, "dispatch": "Sequential"}"#).unwrap();
        assert_eq!(config.name, "Cluster");
        assert_eq!(config.node_count, 5);
        assert_eq!(config.dispatch, DispatchMode::Sequential);
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        assert!(ClusterConfig::new("Cluster", 0).validate().is_err());
        assert!(ClusterConfig::new("", 2).validate().is_err());
        assert!(ClusterConfig::new("Node1", 2).validate().is_err());
        assert!(ClusterConfig::new("InternalClientNode0", 2).validate().is_err());
        assert!(ClusterConfig::new("Node5", 2).validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("cluster-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"name": "Orders", "node_count": 2}"#).unwrap();

        let config = ClusterConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.name, "Orders");
        assert_eq!(config.node_ids(), vec!["Node0", "Node1"]);
    }
}
