//! Generator configuration and defaulting.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for a [`Generator`](crate::Generator).
///
/// Zero-valued fields are resolved to the documented defaults when the
/// generator is constructed; see [`GeneratorConfig::with_defaults`]. The one
/// exception is `update_metrics`: `false` is a legitimate configured choice
/// and is never overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Prefix prepended to every generated metric name
    pub metric_prefix: String,

    /// Number of counters to generate
    pub num_counters: usize,

    /// Number of gauges to generate
    pub num_gauges: usize,

    /// Number of histograms to generate
    pub num_histograms: usize,

    /// Interval between update passes
    pub update_interval: Duration,

    /// Labels attached to every generated metric. `None` means "use the
    /// default label set"; an explicit empty map produces label-free metrics.
    pub labels: Option<HashMap<String, String>>,

    /// Whether the background update task runs at all
    pub update_metrics: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            metric_prefix: "fake_".to_string(),
            num_counters: 10,
            num_gauges: 10,
            num_histograms: 10,
            update_interval: Duration::from_secs(2),
            labels: Some(default_labels()),
            update_metrics: false,
        }
    }
}

fn default_labels() -> HashMap<String, String> {
    HashMap::from([("environment".to_string(), "lazy".to_string())])
}

impl GeneratorConfig {
    /// Replaces zero-valued fields with the documented defaults.
    ///
    /// Called by [`Generator::new`](crate::Generator::new); exposed so
    /// callers can inspect the resolved values up front. Never fails.
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();

        if self.metric_prefix.is_empty() {
            self.metric_prefix = defaults.metric_prefix;
        }
        if self.num_counters == 0 {
            self.num_counters = defaults.num_counters;
        }
        if self.num_gauges == 0 {
            self.num_gauges = defaults.num_gauges;
        }
        if self.num_histograms == 0 {
            self.num_histograms = defaults.num_histograms;
        }
        if self.update_interval.is_zero() {
            self.update_interval = defaults.update_interval;
        }
        if self.labels.is_none() {
            self.labels = defaults.labels;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_config_resolves_to_documented_defaults() {
        let config = GeneratorConfig {
            metric_prefix: String::new(),
            num_counters: 0,
            num_gauges: 0,
            num_histograms: 0,
            update_interval: Duration::ZERO,
            labels: None,
            update_metrics: false,
        }
        .with_defaults();

        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.metric_prefix, "fake_");
        assert_eq!(config.num_counters, 10);
        assert_eq!(config.num_gauges, 10);
        assert_eq!(config.num_histograms, 10);
        assert_eq!(config.update_interval, Duration::from_secs(2));
        assert_eq!(config.labels, Some(default_labels()));
    }

    #[test]
    fn test_configured_values_survive_resolution() {
        let config = GeneratorConfig {
            metric_prefix: "app_".to_string(),
            num_counters: 3,
            num_gauges: 4,
            num_histograms: 5,
            update_interval: Duration::from_millis(500),
            labels: Some(HashMap::from([(
                "environment".to_string(),
                "production".to_string(),
            )])),
            update_metrics: true,
        };

        let resolved = config.clone().with_defaults();
        assert_eq!(resolved, config);
    }

    #[test]
    fn test_explicit_empty_labels_are_preserved() {
        let config = GeneratorConfig {
            labels: Some(HashMap::new()),
            ..Default::default()
        }
        .with_defaults();

        assert_eq!(config.labels, Some(HashMap::new()));
    }

    #[test]
    fn test_partial_zero_fields_resolve_independently() {
        let config = GeneratorConfig {
            metric_prefix: "app_".to_string(),
            num_counters: 0,
            ..Default::default()
        }
        .with_defaults();

        assert_eq!(config.metric_prefix, "app_");
        assert_eq!(config.num_counters, 10);
    }

    #[test]
    fn test_update_metrics_is_taken_as_given() {
        assert!(!GeneratorConfig::default().with_defaults().update_metrics);

        let enabled = GeneratorConfig {
            update_metrics: true,
            ..Default::default()
        }
        .with_defaults();
        assert!(enabled.update_metrics);
    }
}
