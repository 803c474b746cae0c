//! Tests for the metrics module.

use anyhow::Result;
use ironreduce::metrics::*;
use ironreduce::testing::*;
use ironreduce::*;
use serde_json::json;

#[test]
fn run_publishes_builtin_counters() -> Result<()> {
    let metrics = MetricsCollector::new();
    let job = word_count_job(Runner::pool(Some(2)).with_metrics(metrics.clone()));
    job.run(&quick_fox_lines())?;

    assert_eq!(metrics.counter(RECORDS_IN), Some(2));
    assert_eq!(metrics.counter(KV_EMITTED), Some(6));
    assert_eq!(metrics.counter(DISTINCT_KEYS), Some(4));
    assert_eq!(metrics.counter(KEYS_REDUCED), Some(4));
    assert_eq!(metrics.counter(FAILED_TASKS), Some(0));
    assert!(metrics.elapsed().is_some());

    let snapshot = metrics.snapshot();
    for gauge in [MAP_PHASE_MS, SHUFFLE_PHASE_MS, REDUCE_PHASE_MS] {
        assert!(snapshot.get(gauge).is_some_and(|v| v.as_f64().is_some()));
    }
    Ok(())
}

#[test]
fn later_runs_overwrite_counts() -> Result<()> {
    let metrics = MetricsCollector::new();
    let job = word_count_job(Runner::default().with_metrics(metrics.clone()));
    job.run(&distinct_word_lines(50))?;
    job.run(&["solo"])?;
    assert_eq!(metrics.counter(RECORDS_IN), Some(1));
    assert_eq!(metrics.counter(DISTINCT_KEYS), Some(1));
    Ok(())
}

#[test]
fn counters_and_gauges() {
    let collector = MetricsCollector::new();
    collector.increment_counter("requests", 1);
    collector.increment_counter("requests", 5);
    collector.set_gauge("load", 0.5, "Load factor");
    collector.register(Box::new(GaugeMetric::new("pi", std::f64::consts::PI)));

    let snapshot = collector.snapshot();
    assert_eq!(snapshot.get("requests"), Some(&json!(6)));
    assert_eq!(snapshot.get("load"), Some(&json!(0.5)));
    assert_eq!(snapshot.get("pi"), Some(&json!(std::f64::consts::PI)));

    let as_json = collector.to_json();
    assert_eq!(as_json["load"]["description"], json!("Load factor"));
    assert_eq!(as_json["requests"]["value"], json!(6));
}

#[test]
fn save_to_file_writes_json() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("metrics.json");

    let metrics = MetricsCollector::new();
    word_count_job(Runner::default().with_metrics(metrics.clone())).run(&["a b a"])?;
    metrics.save_to_file(&path)?;

    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(parsed[KV_EMITTED]["value"], json!(3));
    assert!(parsed["execution_time_ms"]["value"].is_number());
    Ok(())
}
