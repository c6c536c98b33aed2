use anyhow::Result;
use serde::{Deserialize, Serialize};
use shard_coordinator::ClusterConfig;
use shard_network::NetworkConfig;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cluster: ClusterConfig,
    pub network: NetworkConfig,
    pub show_timing: bool,
    pub max_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            network: NetworkConfig::reliable(),
            show_timing: true,
            max_rows: 1000,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.cluster.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_coordinator::DispatchMode;

    #[test]
    fn test_defaults_are_reliable() {
        let config = Config::default();
        assert!(config.network.fault.reliable);
        assert_eq!(config.cluster.node_count, 3);
        assert_eq!(config.max_rows, 1000);
    }

    #[test]
    fn test_nested_partial_config() {
        let config: Config = serde_json::from_str(
            r#"{"cluster": {"node_count": 4, "dispatch": "Sequential"}, "max_rows": 5}"#,
        )
        .unwrap();
        assert_eq!(config.cluster.node_count, 4);
        assert_eq!(config.cluster.dispatch, DispatchMode::Sequential);
        assert_eq!(config.cluster.name, "Cluster");
        assert_eq!(config.max_rows, 5);
        assert!(config.show_timing);
    }
}
