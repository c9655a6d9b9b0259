//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! discovery daemon. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

use crate::backends::Endpoint;

/// Discovery method accepted by this watcher.
pub const SERF_METHOD: &str = "serf";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Services to watch, one watcher each.
    pub services: Vec<ServiceConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One watched service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service name, matched against `smart:<name>` member tags.
    pub name: String,

    /// Where and how often to look for members.
    pub discovery: SerfDiscoveryConfig,

    /// Load balancer options affecting discovered servers.
    pub haproxy: HaproxyOptions,

    /// Servers published when discovery finds nothing.
    pub default_servers: Vec<ServerConfig>,
}

impl ServiceConfig {
    /// Minimal config for `name` with every other field defaulted.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Default servers as endpoints, in canonical order.
    pub fn default_endpoints(&self) -> Vec<Endpoint> {
        let mut endpoints: Vec<Endpoint> = self.default_servers.iter().map(Endpoint::from).collect();
        endpoints.sort();
        endpoints
    }
}

/// Membership snapshot discovery settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SerfDiscoveryConfig {
    /// Discovery method; must be "serf".
    pub method: String,

    /// Path of the membership snapshot written by the gossip agent.
    pub path: String,

    /// Delay between ticks in milliseconds.
    pub cycle_delay_ms: u64,

    /// Seconds after a change at which one forced re-read happens.
    pub recheck_window_secs: u64,
}

impl Default for SerfDiscoveryConfig {
    fn default() -> Self {
        Self {
            method: SERF_METHOD.to_string(),
            path: "/dev/shm/serf_members.json".to_string(),
            cycle_delay_ms: 1000,
            recheck_window_secs: 10,
        }
    }
}

/// Load balancer options.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HaproxyOptions {
    /// Host that stays primary; all other discovered servers become backups.
    pub all_backups_except_one: Option<String>,
}

/// Statically configured server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server identifier.
    pub name: String,

    pub host: String,

    pub port: String,
}

impl From<&ServerConfig> for Endpoint {
    fn from(server: &ServerConfig) -> Self {
        Endpoint::new(&server.name, &server.host, &server.port)
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
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_service_gets_defaults() {
        let config: DiscoveryConfig = toml::from_str(
            r#"
            [[services]]
            name = "mysql"
            "#,
        )
        .unwrap();

        let service = &config.services[0];
        assert_eq!(service.name, "mysql");
        assert_eq!(service.discovery.method, "serf");
        assert_eq!(service.discovery.path, "/dev/shm/serf_members.json");
        assert_eq!(service.discovery.cycle_delay_ms, 1000);
        assert_eq!(service.discovery.recheck_window_secs, 10);
        assert!(service.haproxy.all_backups_except_one.is_none());
        assert!(service.default_servers.is_empty());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_full_service() {
        let config: DiscoveryConfig = toml::from_str(
            r#"
            [observability]
            log_level = "debug"

            [[services]]
            name = "sphinx"
            default_servers = [
                { name = "z-fallback", host = "10.0.0.9", port = "9312" },
                { name = "a-fallback", host = "10.0.0.8", port = "9312" },
            ]

            [services.discovery]
            path = "/tmp/members.json"
            cycle_delay_ms = 250

            [services.haproxy]
            all_backups_except_one = "10.0.0.1"
            "#,
        )
        .unwrap();

        let service = &config.services[0];
        assert_eq!(service.discovery.path, "/tmp/members.json");
        assert_eq!(service.discovery.cycle_delay_ms, 250);
        assert_eq!(service.discovery.recheck_window_secs, 10);
        assert_eq!(service.haproxy.all_backups_except_one.as_deref(), Some("10.0.0.1"));

        let defaults = service.default_endpoints();
        assert_eq!(defaults[0].name, "a-fallback");
        assert_eq!(defaults[1].address(), "10.0.0.9:9312");
        assert_eq!(config.observability.log_level, "debug");
    }
}
