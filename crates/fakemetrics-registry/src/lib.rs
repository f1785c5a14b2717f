//! In-memory metric registry keyed by fully-rendered identity strings.
//!
//! A metric identity is the complete exported name including its label block,
//! e.g. `fake_counter_0{environment="lazy"}`. The registry stores one metric
//! per identity and serializes all of them in Prometheus text exposition
//! format for scraping. Counters and histograms are written to explicitly;
//! gauges hold a value-producing callback that is invoked on every scrape.
//!
//! # Example
//! ```
//! use fakemetrics_registry::Registry;
//!
//! let registry = Registry::new();
//! registry.get_or_create_counter(r#"requests_total{path="/api"}"#).add(3);
//!
//! let mut out = String::new();
//! registry.write_prometheus(&mut out);
//! assert!(out.contains(r#"requests_total{path="/api"} 3"#));
//! ```

pub mod metrics;
pub mod registry;

pub use metrics::{Counter, Gauge, Histogram, BUCKET_BOUNDS};
pub use registry::Registry;
