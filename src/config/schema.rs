//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream target configuration.
    pub target: TargetConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream target configuration. The port comes from the request path;
/// only the host is deployment-configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Host upstream requests are sent to.
    pub host: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Timeout configuration. Both are opt-in; absent means the transport's
/// defaults apply, which keeps long-lived streaming responses alive.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout in seconds, applied as middleware.
    pub request_secs: Option<u64>,

    /// Upstream call timeout in seconds; expiry maps to 500.
    pub upstream_secs: Option<u64>,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Whether to expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
