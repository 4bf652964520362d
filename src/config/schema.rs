//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_TTL;

/// Root configuration for the caching proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Outbound (origin) request settings.
    pub upstream: UpstreamConfig,

    /// Inbound addressing routes.
    pub routes: RoutesConfig,

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

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve and store GET responses through the cache.
    pub enabled: bool,

    /// Lifetime of a stored response in seconds.
    pub ttl_secs: u64,

    /// Interval between sweeps of expired entries in seconds (0 disables).
    pub sweep_interval_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_TTL.as_secs(),
            sweep_interval_secs: 60,
        }
    }
}

/// Origin request configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL for origin-form requests (reverse-proxy mode), e.g.
    /// "http://127.0.0.1:3000". Absolute-form requests ignore it.
    pub base_url: Option<String>,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Deadline for the origin call, response body included, in seconds.
    pub request_timeout_secs: u64,

    /// Largest origin response body the proxy will buffer.
    pub max_body_bytes: usize,
}

impl UpstreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Inbound route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Path that takes the target from its `url` query parameter.
    /// Every other path is forwarded in pass-through mode.
    pub parameterized_path: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            parameterized_path: "/proxy".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.routes.parameterized_path, "/proxy");
        assert!(config.upstream.base_url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [cache]
            ttl_secs = 60

            [upstream]
            base_url = "http://127.0.0.1:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.ttl_secs, 60);
        assert!(config.cache.enabled);
        assert_eq!(config.upstream.base_url.as_deref(), Some("http://127.0.0.1:3000"));
        assert_eq!(config.upstream.request_timeout_secs, 30);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
