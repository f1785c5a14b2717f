//! Synthetic metrics generator.
//!
//! Registers a configurable population of counters, gauges, and histograms in
//! a shared [`Registry`](fakemetrics_registry::Registry) and drives their
//! values from a single background task: each tick, every counter grows by a
//! random step and every histogram records a random observation. Gauges are
//! bound to callbacks and sample themselves lazily on every scrape instead.
//! Useful for load-testing or demoing a metrics pipeline without a real
//! workload.
//!
//! # Example
//! ```
//! use fakemetrics_generator::{Generator, GeneratorConfig};
//! use fakemetrics_registry::Registry;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> fakemetrics_generator::Result<()> {
//! let registry = Arc::new(Registry::new());
//! let generator = Generator::new(
//!     GeneratorConfig {
//!         update_metrics: true,
//!         ..Default::default()
//!     },
//!     Arc::clone(&registry),
//! );
//!
//! generator.start()?;
//! // ... serve scrapes from the registry ...
//! generator.stop().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod generator;
pub mod naming;

pub use config::GeneratorConfig;
pub use generator::{Generator, GeneratorError, Result};
pub use naming::metric_identity;
