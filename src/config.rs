//! Configuration module for pinghosts

use crate::network::ProbeMethod;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Input file used when none is given
pub const DEFAULT_HOSTS_FILE: &str = "hosts.txt";

/// Probes in flight at once unless configured otherwise
pub const DEFAULT_MAX_CONCURRENCY: usize = 30;

/// Name of the per-user config file, looked up in the home directory
pub const CONFIG_FILE_NAME: &str = ".pinghosts.toml";

/// Main configuration structure for a ping run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfig {
    /// File with one host per line
    pub hosts_file: PathBuf,

    /// Maximum number of probes running at the same time
    pub max_concurrency: usize,

    /// Probe mechanism
    pub method: ProbeMethod,

    /// Program run by the system prober
    pub ping_command: String,

    /// Report results in input order instead of completion order
    pub preserve_order: bool,

    /// Drop repeated hosts while loading the list
    pub deduplicate: bool,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::from(DEFAULT_HOSTS_FILE),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            method: ProbeMethod::System,
            ping_command: "ping".to_string(),
            preserve_order: false,
            deduplicate: true,
        }
    }
}

impl PingConfig {
    pub fn with_hosts_file(mut self, hosts_file: impl Into<PathBuf>) -> Self {
        self.hosts_file = hosts_file.into();
        self
    }

    /// Set the number of concurrent probes
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_method(mut self, method: ProbeMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_ping_command(mut self, ping_command: impl Into<String>) -> Self {
        self.ping_command = ping_command.into();
        self
    }

    pub fn with_preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = preserve_order;
        self
    }

    pub fn with_deduplicate(mut self, deduplicate: bool) -> Self {
        self.deduplicate = deduplicate;
        self
    }

    /// Load configuration from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            crate::PingError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: PingConfig = toml::from_str(content)
            .map_err(|e| crate::PingError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Location of the per-user config file, if a home directory is known
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from default locations
    pub fn load_default_config() -> Self {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                match Self::from_toml_file(&path) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
                }
            }
        }

        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_concurrency == 0 {
            return Err(crate::PingError::ConfigError(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.ping_command.trim().is_empty() {
            return Err(crate::PingError::ConfigError(
                "ping_command cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
