//! Ends, servers and call delivery

use crate::error::{NetworkError, Result};
use crate::fault::FaultConfig;
use crate::message::{Request, Response, WireMessage};
use crate::service::Service;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Upper bound on a whole call, delays included
    pub request_timeout_ms: u64,
    /// Maximum encoded message size in bytes
    pub max_message_size: usize,
    /// Injected faults
    pub fault: FaultConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30000,
            max_message_size: 64 * 1024 * 1024, // 64 MB
            fault: FaultConfig::default(),
        }
    }
}

impl NetworkConfig {
    /// Reliable network with instant failures, for tests
    pub fn reliable() -> Self {
        Self {
            fault: FaultConfig::reliable(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
struct EndState {
    server: Option<String>,
    enabled: bool,
}

struct ServerHandle {
    service: Arc<dyn Service>,
    rpc_count: AtomicU64,
}

struct NetworkInner {
    config: RwLock<NetworkConfig>,
    ends: DashMap<String, EndState>,
    servers: DashMap<String, Arc<ServerHandle>>,
    total_rpcs: AtomicU64,
}

/// A simulated network of named servers reached through named client ends
#[derive(Clone)]
pub struct Network {
    inner: Arc<NetworkInner>,
}

impl Network {
    /// Create a new network
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            inner: Arc::new(NetworkInner {
                config: RwLock::new(config),
                ends: DashMap::new(),
                servers: DashMap::new(),
                total_rpcs: AtomicU64::new(0),
            }),
        }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(NetworkConfig::default())
    }

    /// Non-owning handle, for servers that need to open ends of their own
    /// without keeping the network alive
    pub fn downgrade(&self) -> WeakNetwork {
        WeakNetwork {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Create a client end, or get a handle to the existing end of that name.
    /// New ends are unconnected and disabled.
    pub fn make_end(&self, name: impl Into<String>) -> ClientEnd {
        let name = name.into();
        self.inner.ends.entry(name.clone()).or_default();
        ClientEnd {
            name,
            network: Arc::downgrade(&self.inner),
        }
    }

    /// Point an end at a server
    pub fn connect(&self, end_name: &str, server_name: &str) {
        self.inner
            .ends
            .entry(end_name.to_string())
            .or_default()
            .server = Some(server_name.to_string());
    }

    /// Enable or disable an end. Calls through a disabled end fail.
    pub fn enable(&self, end_name: &str, enabled: bool) {
        self.inner
            .ends
            .entry(end_name.to_string())
            .or_default()
            .enabled = enabled;
    }

    /// Register a server, replacing any server of the same name
    pub fn add_server(&self, name: impl Into<String>, service: Arc<dyn Service>) {
        let name = name.into();
        tracing::debug!("Registered server {}", name);
        self.inner.servers.insert(
            name,
            Arc::new(ServerHandle {
                service,
                rpc_count: AtomicU64::new(0),
            }),
        );
    }

    /// Remove a server. Calls in flight to it lose their replies.
    pub fn delete_server(&self, name: &str) -> bool {
        let removed = self.inner.servers.remove(name).is_some();
        if removed {
            tracing::debug!("Deleted server {}", name);
        }
        removed
    }

    pub fn has_server(&self, name: &str) -> bool {
        self.inner.servers.contains_key(name)
    }

    pub fn set_reliable(&self, reliable: bool) {
        self.inner.config.write().fault.reliable = reliable;
    }

    pub fn set_long_delays(&self, long_delays: bool) {
        self.inner.config.write().fault.long_delays = long_delays;
    }

    pub fn set_long_reordering(&self, long_reordering: bool) {
        self.inner.config.write().fault.long_reordering = long_reordering;
    }

    pub fn set_fault_config(&self, fault: FaultConfig) {
        self.inner.config.write().fault = fault;
    }

    /// Current configuration
    pub fn config(&self) -> NetworkConfig {
        self.inner.config.read().clone()
    }

    /// Number of calls a server has received
    pub fn rpc_count(&self, server_name: &str) -> u64 {
        self.inner
            .servers
            .get(server_name)
            .map(|s| s.rpc_count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Number of calls attempted on the network
    pub fn total_rpc_count(&self) -> u64 {
        self.inner.total_rpcs.load(Ordering::Relaxed)
    }
}

impl NetworkInner {
    /// Resolve an end to its live server, if it has one
    fn route(&self, end_name: &str) -> Result<Option<(String, Arc<ServerHandle>)>> {
        let end = self
            .ends
            .get(end_name)
            .map(|e| e.value().clone())
            .ok_or_else(|| NetworkError::EndNotFound(end_name.to_string()))?;

        if !end.enabled {
            return Ok(None);
        }
        Ok(end.server.and_then(|server_name| {
            self.servers
                .get(&server_name)
                .map(|handle| (server_name, Arc::clone(handle.value())))
        }))
    }

    /// Whether the end is still enabled and still routed to the same server
    fn still_routed(&self, end_name: &str, handle: &Arc<ServerHandle>) -> bool {
        matches!(
            self.route(end_name),
            Ok(Some((_, current))) if Arc::ptr_eq(&current, handle)
        )
    }

    async fn deliver(&self, end_name: &str, request: Request) -> Result<Response> {
        let config = self.config.read().clone();
        let method = request.method();
        let wire = WireMessage::encode(&request, config.max_message_size)?;
        self.total_rpcs.fetch_add(1, Ordering::Relaxed);

        let Some((server_name, handle)) = self.route(end_name)? else {
            tokio::time::sleep(config.fault.failure_delay()).await;
            tracing::debug!("{} from {} failed: end disconnected", method, end_name);
            return Err(NetworkError::Disconnected(end_name.to_string()));
        };

        if let Some(delay) = config.fault.short_delay() {
            tokio::time::sleep(delay).await;
        }
        if config.fault.drop_request() {
            tracing::debug!("{} from {} to {}: request dropped", method, end_name, server_name);
            return Err(NetworkError::RequestDropped(end_name.to_string()));
        }

        handle.rpc_count.fetch_add(1, Ordering::Relaxed);
        let response = handle.service.handle(wire.decode()?).await;

        // The server may have died, or the end been cut, while the handler ran
        if !self.still_routed(end_name, &handle) {
            tokio::time::sleep(config.fault.failure_delay()).await;
            tracing::debug!("{} from {} to {}: reply lost", method, end_name, server_name);
            return Err(NetworkError::ReplyDropped(end_name.to_string()));
        }
        if config.fault.drop_reply() {
            tracing::debug!("{} from {} to {}: reply dropped", method, end_name, server_name);
            return Err(NetworkError::ReplyDropped(end_name.to_string()));
        }
        if let Some(delay) = config.fault.reorder_delay() {
            tokio::time::sleep(delay).await;
        }

        WireMessage::encode(&response, config.max_message_size)?.decode()
    }
}

/// Weak counterpart of [`Network`]
#[derive(Debug, Clone)]
pub struct WeakNetwork {
    inner: Weak<NetworkInner>,
}

impl WeakNetwork {
    pub fn upgrade(&self) -> Option<Network> {
        self.inner.upgrade().map(|inner| Network { inner })
    }
}

/// Client handle for calling one server through a named end
#[derive(Debug, Clone)]
pub struct ClientEnd {
    name: String,
    network: Weak<NetworkInner>,
}

impl ClientEnd {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send a request and wait for its reply.
    ///
    /// `Err` means the call was not delivered or its reply was lost; the
    /// server may or may not have applied it.
    pub async fn call(&self, request: Request) -> Result<Response> {
        let network = self.network.upgrade().ok_or(NetworkError::Shutdown)?;
        let timeout_ms = network.config.read().request_timeout_ms;

        match tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            network.deliver(&self.name, request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(NetworkError::Timeout(timeout_ms)),
        }
    }
}
