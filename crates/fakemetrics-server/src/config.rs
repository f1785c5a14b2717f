//! Server configuration, loadable from a YAML file.

use fakemetrics_generator::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server settings
    pub server: ServerSettings,
    /// Metric generator settings
    pub generator: GeneratorSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            generator: GeneratorSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Server network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Metric generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Prefix prepended to every metric name
    pub metric_prefix: String,
    /// Number of counters to register
    pub num_counters: usize,
    /// Number of gauges to register
    pub num_gauges: usize,
    /// Number of histograms to register
    pub num_histograms: usize,
    /// Interval between update passes in milliseconds
    pub update_interval_ms: u64,
    /// Labels attached to every metric (defaults to environment="lazy")
    pub labels: Option<HashMap<String, String>>,
    /// Whether counters and histograms receive periodic updates
    pub update_metrics: bool,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            metric_prefix: "fake_".to_string(),
            num_counters: 10,
            num_gauges: 10,
            num_histograms: 10,
            update_interval_ms: 2000,
            labels: None,
            update_metrics: true,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Include target in logs
    pub show_target: bool,
    /// Include thread IDs in logs
    pub show_thread_ids: bool,
    /// Include file and line numbers
    pub show_location: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_location: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ServerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Write default config to a file (for generating example config)
    pub fn write_default(path: impl AsRef<Path>) -> anyhow::Result<()> {
        let config = Self::default();
        let yaml = serde_yaml::to_string(&config)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Convert the generator section to a [`GeneratorConfig`]
    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            metric_prefix: self.generator.metric_prefix.clone(),
            num_counters: self.generator.num_counters,
            num_gauges: self.generator.num_gauges,
            num_histograms: self.generator.num_histograms,
            update_interval: Duration::from_millis(self.generator.update_interval_ms),
            labels: self.generator.labels.clone(),
            update_metrics: self.generator.update_metrics,
        }
    }

    /// Get log level
    pub fn log_level(&self) -> Level {
        match self.logging.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}
