//! Environment-driven configuration.

use serde::Serialize;

/// Display name of the host.
pub const APP_NAME: &str = "Agent Stone";
/// Port used when `PORT` is unset or not a number.
pub const DEFAULT_PORT: u16 = 4111;
/// Address used when `HOST` is unset.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Verbosity used when `MASTRA_LOG_LEVEL` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Network settings for the HTTP host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Static settings resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub name: String,
    pub log_level: String,
    pub telemetry_enabled: bool,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: APP_NAME.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            telemetry_enabled: false,
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Read the process environment, after loading a `.env` file if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`. Unset and empty variables both
    /// fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = var("PORT")
            .and_then(|raw| raw.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self {
            name: APP_NAME.to_string(),
            log_level: var("MASTRA_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            telemetry_enabled: lookup("MASTRA_TELEMETRY_ENABLED").as_deref() == Some("true"),
            server: ServerConfig {
                host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = Config::from_lookup(|_| None);

        assert_eq!(config.server.port, 4111);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.log_level, "info");
        assert!(!config.telemetry_enabled);
        assert_eq!(config, Config::default());
        assert_eq!(config.server.bind_address(), "0.0.0.0:4111");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("MASTRA_LOG_LEVEL", "debug"),
            ("MASTRA_TELEMETRY_ENABLED", "true"),
        ]));

        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "debug");
        assert!(config.telemetry_enabled);
        assert_eq!(config.name, "Agent Stone");
    }

    #[test]
    fn unparsable_or_empty_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "not-a-port"),
            ("HOST", ""),
            ("MASTRA_TELEMETRY_ENABLED", "TRUE"),
        ]));

        assert_eq!(config.server.port, 4111);
        assert_eq!(config.server.host, "0.0.0.0");
        // Only the exact string "true" turns telemetry on
        assert!(!config.telemetry_enabled);

        let config = Config::from_lookup(lookup_from(&[("PORT", "70000")]));
        assert_eq!(config.server.port, 4111);
    }
}
