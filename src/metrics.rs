//! Execution metrics for map-reduce runs.
//!
//! A [`MetricsCollector`] attached to a [`crate::Runner`] receives the
//! built-in counters and phase timings of every run it executes. Callers
//! can register their own [`Metric`]s next to them and print or save the
//! whole set as JSON afterwards.
//!
//! # Example
//!
//! ```no_run
//! use ironreduce::*;
//! use ironreduce::metrics::MetricsCollector;
//!
//! # fn main() -> anyhow::Result<()> {
//! let metrics = MetricsCollector::new();
//! let job = MapReduce::new(WordCountMapper::new(), SumReducer)
//!     .with_runner(Runner::default().with_metrics(metrics.clone()));
//! job.run(&["the quick fox".to_string()])?;
//!
//! metrics.print();
//! metrics.save_to_file("metrics.json")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Counter: input records handed to the driver.
pub const RECORDS_IN: &str = "records_in";
/// Counter: key-value records emitted by all mapper tasks.
pub const KV_EMITTED: &str = "kv_emitted";
/// Counter: distinct keys after shuffle.
pub const DISTINCT_KEYS: &str = "distinct_keys";
/// Counter: keys present in the result mapping.
pub const KEYS_REDUCED: &str = "keys_reduced";
/// Counter: mapper and reducer tasks that panicked.
pub const FAILED_TASKS: &str = "failed_tasks";
pub const MAP_PHASE_MS: &str = "map_phase_ms";
pub const SHUFFLE_PHASE_MS: &str = "shuffle_phase_ms";
pub const REDUCE_PHASE_MS: &str = "reduce_phase_ms";

/// Trait for custom metrics.
pub trait Metric: Send + Sync {
    /// The name of this metric (e.g., `kv_emitted`).
    fn name(&self) -> &str;

    /// The current value of this metric as a JSON value.
    fn value(&self) -> Value;

    fn description(&self) -> Option<&str> {
        None
    }
}

/// Thread-safe, cloneable container for run metrics.
///
/// Clones share the same storage, so a collector handed to a runner can be
/// read back through the caller's copy.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsCollectorInner>>,
}

#[derive(Default)]
struct MetricsCollectorInner {
    metrics: HashMap<String, Box<dyn Metric>>,
    counters: HashMap<String, u64>,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MetricsCollectorInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a custom metric, replacing any metric with the same name.
    pub fn register(&self, metric: Box<dyn Metric>) {
        self.lock()
            .metrics
            .insert(metric.name().to_string(), metric);
    }

    pub fn record_start(&self) {
        let mut inner = self.lock();
        inner.start_time = Some(Instant::now());
        inner.end_time = None;
    }

    pub fn record_end(&self) {
        self.lock().end_time = Some(Instant::now());
    }

    /// Elapsed time of the last completed run, if any.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        let inner = self.lock();
        match (inner.start_time, inner.end_time) {
            (Some(start), Some(end)) => Some(end.duration_since(start)),
            _ => None,
        }
    }

    /// Increment a counter by name, creating it at zero first if needed.
    pub fn increment_counter(&self, name: &str, value: u64) {
        *self.lock().counters.entry(name.to_string()).or_insert(0) += value;
    }

    pub fn set_counter(&self, name: &str, value: u64) {
        self.lock().counters.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.lock().counters.get(name).copied()
    }

    /// Set a gauge, replacing any metric registered under the same name.
    pub fn set_gauge(&self, name: &str, value: f64, description: &str) {
        self.register(Box::new(
            GaugeMetric::new(name, value).with_description(description),
        ));
    }

    /// Get a snapshot of all metric names and values.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        let inner = self.lock();
        let mut out: HashMap<String, Value> = inner
            .metrics
            .iter()
            .map(|(name, metric)| (name.clone(), metric.value()))
            .collect();
        for (name, count) in &inner.counters {
            out.insert(name.clone(), json!(count));
        }
        out
    }

    /// All metrics as a JSON object, including total execution time.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let inner = self.lock();
        let mut metrics_json = serde_json::Map::new();

        for (name, count) in &inner.counters {
            metrics_json.insert(name.clone(), json!({ "value": count }));
        }
        for (name, metric) in &inner.metrics {
            let mut metric_obj = serde_json::Map::new();
            metric_obj.insert("value".to_string(), metric.value());
            if let Some(desc) = metric.description() {
                metric_obj.insert("description".to_string(), json!(desc));
            }
            metrics_json.insert(name.clone(), Value::Object(metric_obj));
        }

        if let (Some(start), Some(end)) = (inner.start_time, inner.end_time) {
            metrics_json.insert(
                "execution_time_ms".to_string(),
                json!({
                    "value": end.duration_since(start).as_millis(),
                    "description": "Total run time in milliseconds",
                }),
            );
        }
        Value::Object(metrics_json)
    }

    /// Print all metrics to stdout in a human-readable format.
    pub fn print(&self) {
        println!("\n========== Map-Reduce Metrics ==========");
        if let Some(elapsed) = self.elapsed() {
            println!(
                "Execution Time: {:.3}s ({} ms)",
                elapsed.as_secs_f64(),
                elapsed.as_millis()
            );
            println!("----------------------------------------");
        }

        let mut sorted: Vec<(String, Value)> = self.snapshot().into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in sorted {
            println!("{name}: {value}");
        }
        println!("========================================\n");
    }

    /// Save all metrics to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        let mut file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        file.write_all(formatted.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// A gauge metric that holds a single numeric value.
pub struct GaugeMetric {
    name: String,
    value: f64,
    description: Option<String>,
}

impl GaugeMetric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Metric for GaugeMetric {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Value {
        json!(self.value)
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Counts and phase timings gathered by one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct JobStats {
    pub records: usize,
    pub emitted: usize,
    pub distinct_keys: usize,
    pub keys_reduced: usize,
    pub failed_tasks: usize,
    pub map_elapsed: Duration,
    pub shuffle_elapsed: Duration,
    pub reduce_elapsed: Duration,
}

impl JobStats {
    /// Publish these stats as the collector's built-in metrics.
    pub fn record_into(&self, metrics: &MetricsCollector) {
        metrics.set_counter(RECORDS_IN, self.records as u64);
        metrics.set_counter(KV_EMITTED, self.emitted as u64);
        metrics.set_counter(DISTINCT_KEYS, self.distinct_keys as u64);
        metrics.set_counter(KEYS_REDUCED, self.keys_reduced as u64);
        metrics.set_counter(FAILED_TASKS, self.failed_tasks as u64);
        metrics.set_gauge(
            MAP_PHASE_MS,
            self.map_elapsed.as_secs_f64() * 1e3,
            "Wall time of the map phase",
        );
        metrics.set_gauge(
            SHUFFLE_PHASE_MS,
            self.shuffle_elapsed.as_secs_f64() * 1e3,
            "Wall time of the shuffle barrier and grouping",
        );
        metrics.set_gauge(
            REDUCE_PHASE_MS,
            self.reduce_elapsed.as_secs_f64() * 1e3,
            "Wall time of the reduce phase and result collection",
        );
    }
}
