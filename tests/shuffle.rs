use anyhow::Result;
use ironreduce::testing::*;
use ironreduce::*;

/// Order-sensitive reducer: joins values in the order it receives them.
fn concat(key: String, values: Vec<String>) -> KeyValue<String, String> {
    KeyValue::new(key, values.join(","))
}

/// Every record emits its own index under one shared key.
fn index_of(record: &(usize, &'static str)) -> Vec<KeyValue<String, String>> {
    vec![KeyValue::new(
        record.1.to_string(),
        format!("{}", record.0),
    )]
}

#[test]
fn record_index_order_makes_concatenation_deterministic() -> Result<()> {
    let records: Vec<(usize, &'static str)> = (0..200).map(|i| (i, "k")).collect();
    let expected = (0..200).map(|i| i.to_string()).collect::<Vec<_>>().join(",");

    for shuffle in [ShuffleStrategy::Channel, ShuffleStrategy::Sharded { shards: 5 }] {
        let runner = Runner::pool(Some(6))
            .with_shuffle(shuffle)
            .with_value_order(ValueOrder::RecordIndex);
        let job = MapReduce::new(index_of, concat).with_runner(runner);
        for _ in 0..5 {
            let out = job.run(&records)?;
            assert_eq!(out.get(&"k".to_string()), Some(&expected));
        }
    }
    Ok(())
}

#[test]
fn emit_order_within_a_record_is_kept() -> Result<()> {
    let lines = vec!["c b a".to_string(), "z y".to_string()];
    let job = MapReduce::new(
        |line: &String| {
            line.split(' ')
                .map(|w| KeyValue::new("all".to_string(), w.to_string()))
                .collect()
        },
        concat,
    )
    .with_runner(Runner::default().with_value_order(ValueOrder::RecordIndex));

    let out = job.run(&lines)?;
    assert_eq!(out.get(&"all".to_string()), Some(&"c,b,a,z,y".to_string()));
    Ok(())
}

#[test]
fn arrival_order_still_delivers_every_value() -> Result<()> {
    let records: Vec<(usize, &'static str)> = (0..100).map(|i| (i, "k")).collect();
    let job = MapReduce::new(index_of, concat).with_runner(Runner::pool(Some(4)));
    let out = job.run(&records)?;

    let joined = out.get(&"k".to_string()).cloned().unwrap_or_default();
    let mut seen: Vec<usize> = joined.split(',').map(|v| v.parse().unwrap()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..100).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn sharded_and_channel_shuffles_agree() -> Result<()> {
    let mut lines = sample_text();
    lines.extend(repeated_lines("the the fox", 250));
    lines.extend(distinct_word_lines(1_000));

    let channel = word_count_job(Runner::default()).run(&lines)?;
    for shards in [1, 2, 7, 64] {
        let sharded = word_count_job(
            Runner::default().with_shuffle(ShuffleStrategy::Sharded { shards }),
        )
        .run(&lines)?;
        assert_eq!(sharded, channel);
    }
    Ok(())
}
