use anyhow::Result;
use ironreduce::testing::*;
use ironreduce::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

fn s(v: &str) -> String {
    v.to_string()
}

fn runners() -> Vec<Runner> {
    vec![
        Runner::default(),
        Runner::sequential(),
        Runner::pool(Some(1)),
        Runner::pool(Some(4)),
        Runner::default().with_shuffle(ShuffleStrategy::Sharded { shards: 8 }),
        Runner::pool(Some(3)).with_shuffle(ShuffleStrategy::Sharded { shards: 1 }),
    ]
}

#[test]
fn quick_fox_scenario() -> Result<()> {
    for runner in runners() {
        let out = word_count_job(runner).run(&quick_fox_lines())?;
        assert_mapping_eq(
            &out,
            &[(s("the"), 2), (s("quick"), 1), (s("fox"), 2), (s("jumps"), 1)],
        );
    }
    Ok(())
}

#[test]
fn empty_input_gives_empty_mapping() -> Result<()> {
    let lines: Vec<String> = Vec::new();
    for runner in runners() {
        let out = word_count_job(runner).run(&lines)?;
        assert!(out.is_empty());
    }
    Ok(())
}

#[test]
fn blank_and_non_alphabetic_records_contribute_nothing() -> Result<()> {
    let out = word_count(&[""])?;
    assert!(out.is_empty());

    let out = word_count(&["1234 -- 5678", "   ", "?!"])?;
    assert!(out.is_empty());

    let out = word_count(&["fox", "42", "FOX!"])?;
    assert_mapping_eq(&out, &[(s("fox"), 2)]);
    Ok(())
}

#[test]
fn ten_thousand_distinct_keys_in_every_mode() -> Result<()> {
    let lines = distinct_word_lines(10_000);
    for runner in runners() {
        let out = word_count_job(runner).run(&lines)?;
        assert_eq!(out.len(), 10_000);
        assert!(out.iter().all(|(_, v)| *v == 1));
        assert_eq!(out.get(&alpha_word(9_999)), Some(&1));
    }
    Ok(())
}

#[test]
fn conservation_of_emitted_values() -> Result<()> {
    let mapper = WordCountMapper::new();
    let lines = sample_text();
    let emitted: usize = lines.iter().map(|l| mapper.map(l).len()).sum();

    for runner in runners() {
        let report = word_count_job(runner).run_report(&lines)?;
        assert!(report.is_complete());
        assert_eq!(report.stats.emitted, emitted);
        assert_conserved(&report.mapping, emitted);
    }
    Ok(())
}

#[test]
fn repeated_runs_agree_despite_scheduling() -> Result<()> {
    let mut lines = repeated_lines("alpha beta beta gamma", 500);
    lines.extend(distinct_word_lines(300));
    let job = word_count_job(Runner::pool(Some(8)));

    let first = job.run(&lines)?.into_inner();
    for _ in 0..10 {
        let again: HashMap<String, u64> = job.run(&lines)?.into();
        assert_eq!(again, first);
    }
    assert_eq!(first.get("beta"), Some(&1000));
    Ok(())
}

#[test]
fn no_key_is_invented() -> Result<()> {
    let lines = sample_text();
    let mapper = WordCountMapper::new();
    let emitted: Vec<String> = lines
        .iter()
        .flat_map(|l| mapper.map(l))
        .map(|kv| kv.key)
        .collect();

    let out = word_count(&lines)?;
    assert_all_keys(&out, |k| emitted.contains(k));
    Ok(())
}

#[test]
fn generic_records_keys_and_values() -> Result<()> {
    #[derive(Clone)]
    struct Sale {
        region: &'static str,
        amount: i64,
    }

    let sales = vec![
        Sale { region: "north", amount: 10 },
        Sale { region: "south", amount: -3 },
        Sale { region: "north", amount: 5 },
    ];
    let job = MapReduce::new(
        |sale: &Sale| vec![KeyValue::new(sale.region, sale.amount)],
        |region: &'static str, amounts: Vec<i64>| {
            KeyValue::new(region, amounts.iter().sum::<i64>() as f64 / amounts.len() as f64)
        },
    );

    let out = job.run(&sales)?;
    assert_eq!(out.get(&"north"), Some(&7.5));
    assert_eq!(out.get(&"south"), Some(&-3.0));
    Ok(())
}

#[test]
fn stock_reducers() -> Result<()> {
    let nums: Vec<u32> = (1..=10).collect();
    let by_parity = |n: &u32| vec![KeyValue::new(n % 2, *n)];

    let max = MapReduce::new(by_parity, MaxReducer).run(&nums)?;
    assert_mapping_eq(&max, &[(0, 10), (1, 9)]);

    let count = MapReduce::new(by_parity, CountReducer).run(&nums)?;
    assert_mapping_eq(&count, &[(0, 5), (1, 5)]);

    let sum = MapReduce::new(by_parity, SumReducer).run(&nums)?;
    assert_mapping_eq(&sum, &[(0, 30), (1, 25)]);
    Ok(())
}

#[test]
fn colliding_reducer_output_is_rejected() {
    let job = MapReduce::new(
        |w: &&str| vec![KeyValue::new(w.to_string(), 1u64)],
        |_key: String, values: Vec<u64>| KeyValue::new(s("same"), values.len() as u64),
    );
    match job.run(&["a", "b"]) {
        Err(PipelineError::DuplicateResultKey(k)) => assert_eq!(k, "\"same\""),
        other => panic!("expected duplicate key error, got {other:?}"),
    }
}

#[test]
fn pool_mode_bounds_concurrent_tasks() -> Result<()> {
    let live = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    let job = MapReduce::new(
        |i: &usize| {
            let now = live.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            live.fetch_sub(1, Ordering::SeqCst);
            vec![KeyValue::new(*i % 4, 1u64)]
        },
        SumReducer,
    )
    .with_runner(Runner::pool(Some(2)));

    let records: Vec<usize> = (0..40).collect();
    let out = job.run(&records)?;
    assert_eq!(out.len(), 4);
    assert!(out.iter().all(|(_, n)| *n == 10));

    let peak = peak.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak concurrency was {peak}");
    Ok(())
}
