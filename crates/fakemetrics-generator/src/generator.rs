//! Generator lifecycle and the periodic update loop.

use crate::config::GeneratorConfig;
use crate::naming::metric_identity;
use fakemetrics_registry::Registry;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Generator lifecycle errors.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Generator is already running")]
    AlreadyRunning,

    #[error("Generator has not been started yet")]
    NotStarted,

    #[error("Generator is already stopped")]
    AlreadyStopped,

    #[error("Update task failed: {0}")]
    UpdateTask(#[from] JoinError),
}

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

enum Lifecycle {
    Created,
    Running { update_task: Option<JoinHandle<()>> },
    Stopped,
}

/// Drives a population of synthetic metrics in a shared [`Registry`].
///
/// The lifecycle is single-use: a generator is created, [`start`]ed once, and
/// [`stop`]ped once; calls outside that order return a [`GeneratorError`].
/// The update task is owned by the generator and joined in `stop`, so once
/// `stop` returns no further registry writes from this generator can occur.
///
/// [`start`]: Generator::start
/// [`stop`]: Generator::stop
pub struct Generator {
    config: GeneratorConfig,
    labels: HashMap<String, String>,
    registry: Arc<Registry>,
    shutdown: CancellationToken,
    state: Mutex<Lifecycle>,
}

impl Generator {
    /// Creates a generator from `config` with zero-valued fields resolved to
    /// their defaults. Construction never fails.
    pub fn new(config: GeneratorConfig, registry: Arc<Registry>) -> Self {
        let config = config.with_defaults();
        let labels = config.labels.clone().unwrap_or_default();

        Self {
            config,
            labels,
            registry,
            shutdown: CancellationToken::new(),
            state: Mutex::new(Lifecycle::Created),
        }
    }

    /// The resolved configuration this generator runs with.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Registers the metric population and, if `update_metrics` is set,
    /// spawns the background update task.
    ///
    /// Must be called from within a Tokio runtime when updates are enabled,
    /// since the update task is spawned here.
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();
        match *state {
            Lifecycle::Created => {}
            Lifecycle::Running { .. } => return Err(GeneratorError::AlreadyRunning),
            Lifecycle::Stopped => return Err(GeneratorError::AlreadyStopped),
        }

        info!(
            "Starting generator: {} counters, {} gauges, {} histograms, prefix {:?}",
            self.config.num_counters,
            self.config.num_gauges,
            self.config.num_histograms,
            self.config.metric_prefix
        );
        self.create_metrics();

        let update_task = if self.config.update_metrics {
            let config = self.config.clone();
            let labels = self.labels.clone();
            let registry = Arc::clone(&self.registry);
            let shutdown = self.shutdown.clone();
            Some(tokio::spawn(run_update_loop(
                config, labels, registry, shutdown,
            )))
        } else {
            info!("Metric updates are disabled by configuration");
            None
        };

        *state = Lifecycle::Running { update_task };
        Ok(())
    }

    /// Signals the update task to stop and waits for it to exit.
    ///
    /// This is a strict join: after `stop` returns `Ok`, no further registry
    /// writes from this generator occur. When updates were disabled there is
    /// no task to wait for and only the state transition happens.
    pub async fn stop(&self) -> Result<()> {
        let update_task = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, Lifecycle::Stopped) {
                Lifecycle::Running { update_task } => update_task,
                Lifecycle::Created => {
                    *state = Lifecycle::Created;
                    return Err(GeneratorError::NotStarted);
                }
                Lifecycle::Stopped => return Err(GeneratorError::AlreadyStopped),
            }
        };

        info!("Stopping generator");
        self.shutdown.cancel();

        if let Some(task) = update_task {
            task.await?;
        }

        info!("Generator stopped");
        Ok(())
    }

    /// Registers the full metric population. Gauges are bound to a callback
    /// that produces a fresh random value in `[0, 100)` on every sample.
    fn create_metrics(&self) {
        for i in 0..self.config.num_counters {
            let identity = self.identity(&format!("counter_{}", i));
            self.registry.create_counter(&identity);
        }

        for i in 0..self.config.num_gauges {
            let identity = self.identity(&format!("gauge_{}", i));
            self.registry
                .create_gauge(&identity, || rand::thread_rng().gen_range(0.0..100.0));
        }

        for i in 0..self.config.num_histograms {
            let identity = self.identity(&format!("histogram_{}", i));
            self.registry.create_histogram(&identity);
        }

        debug!("Registered {} metrics", self.registry.len());
    }

    fn identity(&self, base_name: &str) -> String {
        metric_identity(&self.config.metric_prefix, base_name, &self.labels)
    }
}

/// Background task body: runs one update pass per tick until cancelled.
///
/// The task sleeps until the next tick or the shutdown signal, whichever
/// fires first, so cancellation is observed at every tick boundary. The first
/// tick fires one full interval after start, not immediately.
async fn run_update_loop(
    config: GeneratorConfig,
    labels: HashMap<String, String>,
    registry: Arc<Registry>,
    shutdown: CancellationToken,
) {
    let mut ticker = time::interval_at(
        Instant::now() + config.update_interval,
        config.update_interval,
    );
    debug!("Update loop started, interval {:?}", config.update_interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_update_pass(&config, &labels, &registry);
            }
            _ = shutdown.cancelled() => {
                debug!("Update loop observed shutdown, terminating");
                break;
            }
        }
    }
}

/// One update pass: every counter gets a random increment in `[1, 10]` and
/// every histogram records a random observation in `[0, 100)`. Gauges are
/// not touched; they sample themselves on scrape.
fn run_update_pass(
    config: &GeneratorConfig,
    labels: &HashMap<String, String>,
    registry: &Registry,
) {
    let mut rng = rand::thread_rng();

    for i in 0..config.num_counters {
        let identity = metric_identity(&config.metric_prefix, &format!("counter_{}", i), labels);
        registry
            .get_or_create_counter(&identity)
            .add(rng.gen_range(1..=10));
    }

    for i in 0..config.num_histograms {
        let identity = metric_identity(&config.metric_prefix, &format!("histogram_{}", i), labels);
        registry
            .get_or_create_histogram(&identity)
            .observe(rng.gen_range(0.0..100.0));
    }
}
