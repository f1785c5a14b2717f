//! Identity-keyed metric store and Prometheus text exposition.

use crate::metrics::{Counter, Gauge, Histogram, BUCKET_BOUNDS};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use tracing::warn;

enum Metric {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    Histogram(Arc<Histogram>),
}

/// Process-wide store of metrics, shared between generators and the scrape
/// endpoint via `Arc`.
///
/// Identities are opaque strings to the registry; it never parses them except
/// to inject series suffixes into histogram identities at exposition time.
/// Registering an identity that already exists with the same kind returns the
/// existing metric; registering it with a different kind replaces the old
/// metric and logs a warning.
pub struct Registry {
    metrics: RwLock<HashMap<String, Metric>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a counter at `identity`, or returns the existing one.
    pub fn create_counter(&self, identity: &str) -> Arc<Counter> {
        self.get_or_create_counter(identity)
    }

    /// Registers a gauge at `identity` bound to `value_fn`, or returns the
    /// existing gauge (the callback bound first wins).
    ///
    /// The callback runs during exposition while the registry lock is held,
    /// so it must not call back into the registry.
    pub fn create_gauge(
        &self,
        identity: &str,
        value_fn: impl Fn() -> f64 + Send + Sync + 'static,
    ) -> Arc<Gauge> {
        let mut metrics = self.metrics.write();
        if let Some(Metric::Gauge(gauge)) = metrics.get(identity) {
            return Arc::clone(gauge);
        }
        if metrics.contains_key(identity) {
            warn!("Identity {} re-registered as a gauge, replacing", identity);
        }
        let gauge = Arc::new(Gauge::new(value_fn));
        metrics.insert(identity.to_string(), Metric::Gauge(Arc::clone(&gauge)));
        gauge
    }

    /// Registers a histogram at `identity`, or returns the existing one.
    pub fn create_histogram(&self, identity: &str) -> Arc<Histogram> {
        self.get_or_create_histogram(identity)
    }

    /// Returns the counter at `identity`, registering it first if needed.
    pub fn get_or_create_counter(&self, identity: &str) -> Arc<Counter> {
        let mut metrics = self.metrics.write();
        if let Some(Metric::Counter(counter)) = metrics.get(identity) {
            return Arc::clone(counter);
        }
        if metrics.contains_key(identity) {
            warn!("Identity {} re-registered as a counter, replacing", identity);
        }
        let counter = Arc::new(Counter::new());
        metrics.insert(identity.to_string(), Metric::Counter(Arc::clone(&counter)));
        counter
    }

    /// Returns the histogram at `identity`, registering it first if needed.
    pub fn get_or_create_histogram(&self, identity: &str) -> Arc<Histogram> {
        let mut metrics = self.metrics.write();
        if let Some(Metric::Histogram(histogram)) = metrics.get(identity) {
            return Arc::clone(histogram);
        }
        if metrics.contains_key(identity) {
            warn!("Identity {} re-registered as a histogram, replacing", identity);
        }
        let histogram = Arc::new(Histogram::new());
        metrics.insert(identity.to_string(), Metric::Histogram(Arc::clone(&histogram)));
        histogram
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.metrics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.read().is_empty()
    }

    /// Serializes every registered metric in Prometheus text exposition
    /// format, sorted by identity for deterministic output.
    ///
    /// Counters and gauges produce one `identity value` line each (the
    /// identity already carries its label block). Histograms expand into
    /// `_bucket`, `_sum`, and `_count` series with the suffix injected before
    /// the label block.
    pub fn write_prometheus(&self, out: &mut String) {
        let metrics = self.metrics.read();
        let mut identities: Vec<&String> = metrics.keys().collect();
        identities.sort();

        for identity in identities {
            match &metrics[identity] {
                Metric::Counter(counter) => {
                    let _ = writeln!(out, "{} {}", identity, counter.get());
                }
                Metric::Gauge(gauge) => {
                    let _ = writeln!(out, "{} {}", identity, gauge.get());
                }
                Metric::Histogram(histogram) => {
                    render_histogram(identity, histogram, out);
                }
            }
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn render_histogram(identity: &str, histogram: &Histogram, out: &mut String) {
    let snapshot = histogram.snapshot();
    let (name, labels) = split_identity(identity);

    for (i, bound) in BUCKET_BOUNDS.iter().enumerate() {
        let series = bucket_series(name, labels, &bound.to_string());
        let _ = writeln!(out, "{} {}", series, snapshot.buckets[i]);
    }
    let _ = writeln!(out, "{} {}", bucket_series(name, labels, "+Inf"), snapshot.count);
    let _ = writeln!(out, "{} {}", suffixed_series(name, labels, "_sum"), snapshot.sum);
    let _ = writeln!(out, "{} {}", suffixed_series(name, labels, "_count"), snapshot.count);
}

/// Splits an identity into its metric name and the contents of its label
/// block, if any.
fn split_identity(identity: &str) -> (&str, Option<&str>) {
    match identity.find('{') {
        Some(pos) => {
            let labels = identity[pos..].trim_start_matches('{').trim_end_matches('}');
            if labels.is_empty() {
                (&identity[..pos], None)
            } else {
                (&identity[..pos], Some(labels))
            }
        }
        None => (identity, None),
    }
}

fn suffixed_series(name: &str, labels: Option<&str>, suffix: &str) -> String {
    match labels {
        Some(labels) => format!("{}{}{{{}}}", name, suffix, labels),
        None => format!("{}{}", name, suffix),
    }
}

fn bucket_series(name: &str, labels: Option<&str>, le: &str) -> String {
    match labels {
        Some(labels) => format!("{}_bucket{{{},le=\"{}\"}}", name, labels, le),
        None => format!("{}_bucket{{le=\"{}\"}}", name, le),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_returns_the_same_counter() {
        let registry = Registry::new();

        let first = registry.create_counter("hits");
        first.add(5);
        let second = registry.get_or_create_counter("hits");
        second.add(3);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.get(), 8);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_create_gauge_keeps_the_first_callback() {
        let registry = Registry::new();

        let first = registry.create_gauge("fill_pct", || 10.0);
        let second = registry.create_gauge("fill_pct", || 99.0);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.get(), 10.0);
    }

    #[test]
    fn test_kind_collision_replaces_the_metric() {
        let registry = Registry::new();
        registry.create_counter("mixed").add(7);

        let histogram = registry.get_or_create_histogram("mixed");
        histogram.observe(1.0);

        assert_eq!(registry.len(), 1);
        let mut out = String::new();
        registry.write_prometheus(&mut out);
        assert!(out.contains("mixed_count 1"));
        assert!(!out.contains("mixed 7"));
    }

    #[test]
    fn test_write_prometheus_counters_and_gauges() {
        let registry = Registry::new();
        registry.create_counter(r#"hits{env="test"}"#).add(7);
        registry.create_gauge("temperature", || 21.5);

        let mut out = String::new();
        registry.write_prometheus(&mut out);

        assert!(out.contains(r#"hits{env="test"} 7"#));
        assert!(out.contains("temperature 21.5"));
    }

    #[test]
    fn test_write_prometheus_histogram_series() {
        let registry = Registry::new();
        let histogram = registry.create_histogram(r#"latency{env="test"}"#);
        histogram.observe(3.0);
        histogram.observe(40.0);

        let mut out = String::new();
        registry.write_prometheus(&mut out);

        assert!(out.contains(r#"latency_bucket{env="test",le="5"} 1"#));
        assert!(out.contains(r#"latency_bucket{env="test",le="50"} 2"#));
        assert!(out.contains(r#"latency_bucket{env="test",le="+Inf"} 2"#));
        assert!(out.contains(r#"latency_sum{env="test"} 43"#));
        assert!(out.contains(r#"latency_count{env="test"} 2"#));
    }

    #[test]
    fn test_histogram_without_labels_gets_plain_suffixes() {
        let registry = Registry::new();
        registry.create_histogram("latency").observe(2.0);

        let mut out = String::new();
        registry.write_prometheus(&mut out);

        assert!(out.contains(r#"latency_bucket{le="5"} 1"#));
        assert!(out.contains("latency_sum 2"));
        assert!(out.contains("latency_count 1"));
    }

    #[test]
    fn test_output_is_sorted_by_identity() {
        let registry = Registry::new();
        registry.create_counter("b_total").add(1);
        registry.create_counter("a_total").add(1);

        let mut out = String::new();
        registry.write_prometheus(&mut out);

        let a = out.find("a_total").unwrap();
        let b = out.find("b_total").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_split_identity() {
        assert_eq!(split_identity("plain"), ("plain", None));
        assert_eq!(split_identity(r#"name{env="x"}"#), ("name", Some(r#"env="x""#)));
        assert_eq!(split_identity("odd{}"), ("odd", None));
    }
}
