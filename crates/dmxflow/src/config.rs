//! Daemon configuration file
//!
//! One TOML file holds the engine settings, the catalog location, fixture
//! placements, the HTTP service and logging.

use anyhow::{bail, Context, Result};
use dmxflow_control::EngineConfig;
use dmxflow_core::PortAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixture catalog location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding `*.json` fixture definitions
    pub directory: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("fixtures"),
        }
    }
}

/// A fixture to place at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixturePlacement {
    /// Instance name
    pub name: String,
    /// Catalog manufacturer
    pub manufacturer: String,
    /// Catalog model
    pub model: String,
    /// Mode name
    pub mode: String,
    /// Universe, flat or `{ net, sub_net, universe }`
    pub universe: PortAddress,
    /// 1-based starting address
    pub address: u16,
}

/// Catalog HTTP service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Serve the catalog
    pub enabled: bool,
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // Local only unless configured otherwise
            host: "127.0.0.1".to_string(),
            port: 8123,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level; `RUST_LOG` takes precedence
    pub level: String,
    /// Log to stderr
    pub console: bool,
    /// Optional log file
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: true,
            file: None,
        }
    }
}

/// Complete daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `[engine]`
    pub engine: EngineConfig,
    /// `[catalog]`
    pub catalog: CatalogConfig,
    /// `[[fixtures]]`
    pub fixtures: Vec<FixturePlacement>,
    /// `[http]`
    pub http: HttpConfig,
    /// `[logging]`
    pub logging: LogConfig,
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("In config file {:?}", path))
    }

    /// Check engine settings and fixture placements
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;

        for placement in &self.fixtures {
            if placement.address == 0 || placement.address > 512 {
                bail!(
                    "Fixture '{}': address {} out of range (1-512)",
                    placement.name,
                    placement.address
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.catalog.directory, PathBuf::from("fixtures"));
        assert_eq!(config.http.port, 8123);
        assert!(!config.http.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
            [engine]
            bind_address = "0.0.0.0:6454"
            refresh_interval_ms = 25

            [[engine.universes]]
            address = 3
            destinations = ["192.168.1.3:6454"]

            [catalog]
            directory = "/etc/dmxflow/fixtures"

            [[fixtures]]
            name = "Front wash"
            manufacturer = "Eurolite"
            model = "LED TMH-6"
            mode = "9 Channel"
            universe = 3
            address = 1

            [[fixtures]]
            name = "Back light"
            manufacturer = "Generic"
            model = "RGB Par"
            mode = "3 Channel"
            universe = { net = 0, sub_net = 0, universe = 3 }
            address = 10

            [http]
            enabled = true
            port = 9000

            [logging]
            level = "debug"
            file = "dmxflow.log"
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.universes.len(), 1);
        assert_eq!(config.fixtures.len(), 2);
        assert_eq!(config.fixtures[0].universe, config.fixtures[1].universe);
        assert!(config.http.enabled);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.logging.file, Some(PathBuf::from("dmxflow.log")));
    }

    #[test]
    fn test_invalid_fixture_address() {
        let result = AppConfig::from_toml_str(
            r#"
            [[fixtures]]
            name = "Par"
            manufacturer = "Generic"
            model = "RGB Par"
            mode = "3 Channel"
            universe = 0
            address = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_engine_section() {
        assert!(AppConfig::from_toml_str("[engine]\nrefresh_interval_ms = 0").is_err());
    }

    #[test]
    fn test_sample_config() {
        let config = AppConfig::from_toml_str(include_str!("../../../dmxflow.toml")).unwrap();
        assert_eq!(config.fixtures.len(), 2);
        assert_eq!(config.engine.universes[0].address.flat(), 3);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nenabled = true").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert!(config.http.enabled);

        assert!(AppConfig::load(Path::new("/nonexistent/dmxflow.toml")).is_err());
    }
}
