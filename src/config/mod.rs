//! Configuration loading and management
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 4000
//!   playground: true
//! backend:
//!   base_url: http://localhost:3000
//!   timeout_secs: 30
//! log_level: info
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use crate::core::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// HTTP listener configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Serve the interactive query explorer on `GET /graphql`
    pub playground: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            playground: true,
        }
    }
}

/// REST backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL the entity paths are appended to
    pub base_url: String,

    /// Per-request timeout; `None` waits forever
    pub timeout_secs: Option<u64>,

    /// Serve entities from a json-server `db.json` instead of over HTTP
    pub fixtures: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: Some(30),
            fixtures: None,
        }
    }
}

/// Complete gateway configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: Option<String>,
}

impl GatewayConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.fixtures.is_none() {
            let url = &self.backend.base_url;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    message: format!("backend.base_url must be an http(s) URL, got '{}'", url),
                });
            }
        }
        if self.backend.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                message: "backend.timeout_secs must be greater than 0".to_string(),
            });
        }
        self.listen_addr()?;
        Ok(())
    }

    /// Socket address the server binds to
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                message: format!(
                    "invalid listen address '{}:{}': {}",
                    self.server.host, self.server.port, e
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.port, 4000);
        assert!(config.server.playground);
        assert_eq!(config.backend.base_url, "http://localhost:3000");
        assert_eq!(config.backend.timeout_secs, Some(30));
        assert_eq!(config.listen_addr().unwrap().port(), 4000);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = GatewayConfig::from_yaml_str(
            r#"
server:
  port: 8080
backend:
  base_url: http://api.internal:9000
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.backend.base_url, "http://api.internal:9000");
        assert_eq!(config.backend.timeout_secs, Some(30));
    }

    #[test]
    fn test_yaml_serialization() {
        let config = GatewayConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = GatewayConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = GatewayConfig::from_yaml_str("backend:\n  base_url: localhost:3000\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = GatewayConfig::from_yaml_str("backend:\n  timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = GatewayConfig::from_yaml_str("server:\n  host: not a host\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = GatewayConfig::from_yaml_str("server: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_fixtures_skip_url_check() {
        let config =
            GatewayConfig::from_yaml_str("backend:\n  base_url: ''\n  fixtures: db.json\n").unwrap();
        assert_eq!(config.backend.fixtures, Some(PathBuf::from("db.json")));
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level: debug").unwrap();

        let config = GatewayConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));

        let err = GatewayConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
