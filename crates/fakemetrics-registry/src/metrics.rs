//! Counter, gauge, and histogram primitives.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Upper bucket bounds used by every histogram. Buckets are cumulative: an
/// observation lands in each bucket whose bound it does not exceed.
pub const BUCKET_BOUNDS: [f64; 8] = [1.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0];

/// Monotonically increasing counter.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the counter.
    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    /// Increments the counter by 1.
    pub fn inc(&self) {
        self.add(1);
    }

    /// Returns the current value.
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Gauge backed by a value-producing callback.
///
/// Nothing is stored: every call to [`Gauge::get`], including every scrape,
/// invokes the callback bound at creation time.
pub struct Gauge {
    value_fn: Box<dyn Fn() -> f64 + Send + Sync>,
}

impl Gauge {
    pub fn new(value_fn: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        Self {
            value_fn: Box::new(value_fn),
        }
    }

    /// Samples the gauge by invoking its callback.
    pub fn get(&self) -> f64 {
        (self.value_fn)()
    }
}

/// Histogram with fixed cumulative buckets plus running count/sum/min/max.
pub struct Histogram {
    inner: Mutex<HistogramInner>,
}

#[derive(Debug, Clone)]
struct HistogramInner {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    buckets: [u64; BUCKET_BOUNDS.len()],
}

/// Point-in-time copy of a histogram's exported state.
#[derive(Debug, Clone)]
pub(crate) struct HistogramSnapshot {
    pub count: u64,
    pub sum: f64,
    pub buckets: [u64; BUCKET_BOUNDS.len()],
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HistogramInner {
                count: 0,
                sum: 0.0,
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
                buckets: [0; BUCKET_BOUNDS.len()],
            }),
        }
    }

    /// Records one observation.
    pub fn observe(&self, value: f64) {
        let mut inner = self.inner.lock();
        inner.count += 1;
        inner.sum += value;
        inner.min = inner.min.min(value);
        inner.max = inner.max.max(value);
        for (i, bound) in BUCKET_BOUNDS.iter().enumerate() {
            if value <= *bound {
                inner.buckets[i] += 1;
            }
        }
    }

    /// Number of recorded observations.
    pub fn count(&self) -> u64 {
        self.inner.lock().count
    }

    /// Sum of all recorded observations.
    pub fn sum(&self) -> f64 {
        self.inner.lock().sum
    }

    /// Smallest observation so far, or `None` before the first one.
    pub fn min(&self) -> Option<f64> {
        let inner = self.inner.lock();
        if inner.count == 0 {
            None
        } else {
            Some(inner.min)
        }
    }

    /// Largest observation so far, or `None` before the first one.
    pub fn max(&self) -> Option<f64> {
        let inner = self.inner.lock();
        if inner.count == 0 {
            None
        } else {
            Some(inner.max)
        }
    }

    pub(crate) fn snapshot(&self) -> HistogramSnapshot {
        let inner = self.inner.lock();
        HistogramSnapshot {
            count: inner.count,
            sum: inner.sum,
            buckets: inner.buckets,
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_counter_add_and_inc() {
        let counter = Counter::new();
        assert_eq!(counter.get(), 0);

        counter.add(5);
        counter.inc();
        assert_eq!(counter.get(), 6);
    }

    #[test]
    fn test_gauge_invokes_callback_on_every_sample() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_in_gauge = Arc::clone(&calls);

        let gauge = Gauge::new(move || {
            calls_in_gauge.fetch_add(1, Ordering::Relaxed);
            42.5
        });

        assert_eq!(gauge.get(), 42.5);
        assert_eq!(gauge.get(), 42.5);
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_histogram_tracks_count_sum_min_max() {
        let histogram = Histogram::new();
        assert_eq!(histogram.count(), 0);
        assert!(histogram.min().is_none());
        assert!(histogram.max().is_none());

        histogram.observe(4.0);
        histogram.observe(80.0);
        histogram.observe(12.0);

        assert_eq!(histogram.count(), 3);
        assert_eq!(histogram.sum(), 96.0);
        assert_eq!(histogram.min(), Some(4.0));
        assert_eq!(histogram.max(), Some(80.0));
    }

    #[test]
    fn test_histogram_buckets_are_cumulative() {
        let histogram = Histogram::new();
        histogram.observe(0.5);
        histogram.observe(30.0);
        histogram.observe(300.0); // above the largest bound

        let snapshot = histogram.snapshot();
        assert_eq!(snapshot.count, 3);

        // 0.5 lands in every bucket, 30.0 from le=50 upward, 300.0 in none.
        assert_eq!(snapshot.buckets[0], 1); // le=1
        assert_eq!(snapshot.buckets[3], 1); // le=25
        assert_eq!(snapshot.buckets[4], 2); // le=50
        assert_eq!(snapshot.buckets[7], 2); // le=250
    }
}
