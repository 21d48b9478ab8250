//! Server configuration for Lawva.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `LAWVA_*` environment variables.

use std::collections::HashSet;
use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 3000;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Certification ids the mock repository reports as missing.
    pub missing_ids: HashSet<i64>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on, binds to `0.0.0.0`
    /// - `LAWVA_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:3000`)
    /// - `LAWVA_LOG_LEVEL`: log filter (default: `info`)
    /// - `LAWVA_MISSING_IDS`: comma-separated ids answered with 404 (default: none)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Priority: LAWVA_BIND_ADDR > PORT > default 127.0.0.1:3000
        let bind_addr = if let Some(addr) = lookup("LAWVA_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))
        } else if let Some(port_str) = lookup("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_PORT);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT))
        };

        let log_level = lookup("LAWVA_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let missing_ids: HashSet<i64> = lookup("LAWVA_MISSING_IDS")
            .map(|raw| {
                raw.split(',')
                    .filter_map(|s| s.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            bind_addr,
            log_level,
            missing_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_bind_localhost() {
        let config = config_with(&[]);
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.log_level, "info");
        assert!(config.missing_ids.is_empty());
    }

    #[test]
    fn port_binds_all_interfaces() {
        let config = config_with(&[("PORT", "8080")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
    }

    #[test]
    fn bind_addr_overrides_port() {
        let config = config_with(&[("PORT", "8080"), ("LAWVA_BIND_ADDR", "127.0.0.1:9000")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 9000)));
    }

    #[test]
    fn missing_ids_skip_garbage() {
        let config = config_with(&[("LAWVA_MISSING_IDS", "7, 9,abc,,11")]);
        assert_eq!(config.missing_ids, HashSet::from([7, 9, 11]));
    }
}
