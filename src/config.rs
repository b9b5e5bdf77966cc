//! Service configuration.
//!
//! Loaded from an optional TOML file named by `PERISHABLE_ROUTING_CONFIG`,
//! with missing fields falling back to defaults, then `HOST` / `PORT`
//! environment overrides.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [logging]
//! level = "debug"
//!
//! [simulation]
//! default_orders = 100
//! default_seed = 7
//!
//! [[transporters]]
//! id = 1
//! name = "Night Reefer"
//! vehicle = "Refrigerated Truck"
//! cold_chain = true
//! capacity = 1200
//! cost_per_km = 14.0
//! speed_kmph = 55.0
//! quality = 0.9
//! ```

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::domain::TransportOption;
use crate::error::RoutingError;
use crate::simulation::SimulationConfig;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "PERISHABLE_ROUTING_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationDefaults,
    /// Replaces the reference carriers when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transporters: Option<Vec<TransportOption>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for this crate when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationDefaults {
    #[serde(default = "default_orders")]
    pub default_orders: usize,
    #[serde(default = "default_seed")]
    pub default_seed: u64,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    7860
}
fn default_log_level() -> String {
    "info".into()
}
fn default_orders() -> usize {
    SimulationConfig::default().num_orders
}
fn default_seed() -> u64 {
    SimulationConfig::default().seed
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// Subscriber filter: `rust_log` directives when set, otherwise this
    /// crate at the configured level.
    pub fn env_filter(&self, rust_log: Option<&str>) -> Result<EnvFilter, RoutingError> {
        match rust_log.filter(|directives| !directives.trim().is_empty()) {
            Some(directives) => EnvFilter::try_new(directives)
                .map_err(|e| RoutingError::Config(format!("invalid RUST_LOG: {}", e))),
            None => EnvFilter::try_new(format!("perishable_routing={}", self.level))
                .map_err(|_| RoutingError::Config(format!("invalid log level: {}", self.level))),
        }
    }
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            default_orders: default_orders(),
            default_seed: default_seed(),
        }
    }
}

impl SimulationDefaults {
    /// Harness parameters with optional per-request overrides.
    pub fn resolve(&self, num_orders: Option<usize>, seed: Option<u64>) -> SimulationConfig {
        SimulationConfig {
            num_orders: num_orders.unwrap_or(self.default_orders),
            seed: seed.unwrap_or(self.default_seed),
        }
    }
}

impl ServiceConfig {
    /// Parses a TOML document.
    ///
    /// ```
    /// use perishable_routing::config::ServiceConfig;
    ///
    /// let config = ServiceConfig::from_toml("[server]\nport = 9000\n").unwrap();
    /// assert_eq!(config.server.port, 9000);
    /// assert_eq!(config.server.host, "0.0.0.0");
    /// assert_eq!(config.logging.level, "info");
    /// ```
    pub fn from_toml(contents: &str) -> Result<Self, RoutingError> {
        toml::from_str(contents).map_err(|e| RoutingError::Config(e.to_string()))
    }

    /// Loads a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, RoutingError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RoutingError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`] and applies `HOST` / `PORT`.
    pub fn from_env() -> Result<Self, RoutingError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_overrides(std::env::var("HOST").ok(), std::env::var("PORT").ok())?;
        Ok(config)
    }

    fn apply_overrides(&mut self, host: Option<String>, port: Option<String>) -> Result<(), RoutingError> {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port
                .parse()
                .map_err(|_| RoutingError::Config(format!("invalid PORT: {}", port)))?;
        }
        Ok(())
    }

    /// The address the HTTP server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, RoutingError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                RoutingError::Config(format!(
                    "invalid listen address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.socket_addr().unwrap(), "0.0.0.0:7860".parse::<SocketAddr>().unwrap());
        assert_eq!(config.simulation.default_orders, 50);
        assert_eq!(config.simulation.default_seed, 42);
        assert!(config.transporters.is_none());
    }

    #[test]
    fn test_full_document() {
        let config = ServiceConfig::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [logging]
            level = "debug"

            [simulation]
            default_orders = 10

            [[transporters]]
            id = 4
            name = "Night Reefer"
            vehicle = "Refrigerated Truck"
            cold_chain = true
            capacity = 1200
            cost_per_km = 14.0
            speed_kmph = 55.0
            quality = 0.9
            "#,
        )
        .unwrap();

        assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.simulation.default_orders, 10);
        assert_eq!(config.simulation.default_seed, 42);

        let transporters = config.transporters.unwrap();
        assert_eq!(transporters.len(), 1);
        assert_eq!(transporters[0].route_multiplier, 1.0);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            ServiceConfig::from_toml("[server]\nport = \"eighty\""),
            Err(RoutingError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServiceConfig::load(Path::new("/nonexistent/perishable-routing.toml")).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_overrides() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(Some("127.0.0.1".into()), Some("9100".into()))
            .unwrap();
        assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:9100".parse::<SocketAddr>().unwrap());

        assert!(config.apply_overrides(None, Some("http".into())).is_err());
    }

    #[test]
    fn test_rust_log_takes_precedence() {
        let logging = LoggingConfig::default();

        let filter = logging.env_filter(Some("perishable_routing=debug")).unwrap();
        assert_eq!(filter.to_string(), "perishable_routing=debug");

        let filter = logging.env_filter(None).unwrap();
        assert_eq!(filter.to_string(), "perishable_routing=info");

        let filter = logging.env_filter(Some("  ")).unwrap();
        assert_eq!(filter.to_string(), "perishable_routing=info");
    }

    #[test]
    fn test_invalid_log_level() {
        let logging = LoggingConfig {
            level: "loud".into(),
        };
        assert!(matches!(logging.env_filter(None), Err(RoutingError::Config(_))));
    }

    #[test]
    fn test_simulation_resolution() {
        let defaults = SimulationDefaults::default();
        assert_eq!(defaults.resolve(None, None), SimulationConfig::default());
        assert_eq!(
            defaults.resolve(Some(5), Some(1)),
            SimulationConfig { num_orders: 5, seed: 1 }
        );
    }
}
