//! Server configuration

use ::config::{Config, Environment, Map};
use serde::Deserialize;

use crate::server::ServerError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_APP_ENV: &str = "development";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Deployment label, only logged
    pub app_env: String,
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            app_env: DEFAULT_APP_ENV.to_string(),
            cors_enabled: true,
        }
    }
}

/// Environment keys, lower-cased by the `config` environment source
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    host: Option<String>,
    port: Option<u16>,
    app_env: Option<String>,
    cors_enabled: Option<bool>,
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `APP_ENV` and `CORS_ENABLED` from the environment
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_source(Environment::default())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, ServerError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Map<String, String> = vars.into_iter().collect();
        Self::from_source(Environment::default().source(Some(vars)))
    }

    fn from_source(source: Environment) -> Result<Self, ServerError> {
        let overrides: EnvOverrides = Config::builder()
            .add_source(source.ignore_empty(true))
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| ServerError::Config {
                reason: e.to_string(),
            })?;

        let mut config = Self::default();
        if let Some(host) = overrides.host.filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = overrides.port {
            config.port = port;
        }
        if let Some(env) = overrides.app_env.filter(|e| !e.trim().is_empty()) {
            config.app_env = env.trim().to_string();
        }
        if let Some(cors) = overrides.cors_enabled {
            config.cors_enabled = cors;
        }
        Ok(config)
    }

    /// `host:port` as handed to the listener
    pub fn listen_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert!(config.cors_enabled);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_vars(vars(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("CORS_ENABLED", "false"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.app_env, "production");
        assert!(!config.cors_enabled);
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = ServerConfig::from_vars(vars(&[("HOST", ""), ("PORT", "")])).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_ipv6_host_bracketed() {
        let config = ServerConfig::from_vars(vars(&[("HOST", "::1"), ("PORT", "9000")])).unwrap();
        assert_eq!(config.listen_addr(), "[::1]:9000");
    }

    #[test]
    fn test_invalid_port() {
        for port in ["http", "70000"] {
            let result = ServerConfig::from_vars(vars(&[("PORT", port)]));
            assert!(
                matches!(result, Err(ServerError::Config { .. })),
                "PORT={} should be rejected, got {:?}",
                port,
                result
            );
        }
    }

    #[test]
    fn test_invalid_cors_flag() {
        let result = ServerConfig::from_vars(vars(&[("CORS_ENABLED", "maybe")]));
        assert!(matches!(result, Err(ServerError::Config { .. })));
    }
}
