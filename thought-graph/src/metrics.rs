//! Metrics surface.
//!
//! `MetricsCollector` is the seam a host application hangs a Prometheus or
//! OTLP exporter off; this crate only ships [`InMemoryMetricsCollector`],
//! an in-process aggregator good enough for tests and small embeddings.

use std::collections::HashMap;
use std::sync::Mutex;

/// Counters, gauges, and histograms/timings. Implementations must not
/// block the search on slow downstream exporters; the in-memory collector
/// here is synchronous and cheap, but a production exporter should buffer
/// and flush asynchronously.
pub trait MetricsCollector: Send + Sync {
    fn increment(&self, name: &str, by: u64);
    fn gauge(&self, name: &str, value: i64);
    fn timing(&self, name: &str, milliseconds: f64);
    fn histogram(&self, name: &str, value: f64);
}

#[derive(Debug, Clone, Default)]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub max: f64,
}

#[derive(Debug, Default)]
struct Inner {
    counters: HashMap<String, u64>,
    gauges: HashMap<String, i64>,
    histograms: HashMap<String, HistogramSummary>,
}

/// Reference in-process metrics sink. Useful for tests and for embedding
/// the engine without a real metrics backend.
#[derive(Debug, Default)]
pub struct InMemoryMetricsCollector {
    inner: Mutex<Inner>,
}

impl InMemoryMetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: &str) -> u64 {
        self.inner.lock().unwrap().counters.get(name).copied().unwrap_or(0)
    }

    pub fn gauge_value(&self, name: &str) -> i64 {
        self.inner.lock().unwrap().gauges.get(name).copied().unwrap_or(0)
    }

    pub fn histogram_summary(&self, name: &str) -> HistogramSummary {
        self.inner
            .lock()
            .unwrap()
            .histograms
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

impl MetricsCollector for InMemoryMetricsCollector {
    fn increment(&self, name: &str, by: u64) {
        *self.inner.lock().unwrap().counters.entry(name.to_string()).or_insert(0) += by;
    }

    fn gauge(&self, name: &str, value: i64) {
        self.inner.lock().unwrap().gauges.insert(name.to_string(), value);
    }

    fn timing(&self, name: &str, milliseconds: f64) {
        self.histogram(name, milliseconds);
    }

    fn histogram(&self, name: &str, value: f64) {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner.histograms.entry(name.to_string()).or_default();
        entry.count += 1;
        entry.sum += value;
        if value > entry.max {
            entry.max = value;
        }
    }
}

/// Metrics collector that discards everything; the default when a host
/// does not care to wire one up.
#[derive(Debug, Default)]
pub struct NullMetricsCollector;

impl MetricsCollector for NullMetricsCollector {
    fn increment(&self, _name: &str, _by: u64) {}
    fn gauge(&self, _name: &str, _value: i64) {}
    fn timing(&self, _name: &str, _milliseconds: f64) {}
    fn histogram(&self, _name: &str, _value: f64) {}
}
