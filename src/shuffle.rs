//! Shuffle: the hand-off between mapper tasks and the grouping step.
//!
//! Mapper tasks publish through a [`ShuffleSink`]; once every task has been
//! joined the driver calls [`ShuffleSink::drain`], which counts arrivals
//! against the map-phase barrier and builds the [`IntermediateGroup`].
//!
//! Two strategies are available:
//! - [`ShuffleStrategy::Channel`]: tasks send their whole output over a
//!   channel and a single aggregator groups it.
//! - [`ShuffleStrategy::Sharded`]: tasks insert straight into a map split
//!   into mutex-guarded shards (chosen by key hash), and only a completion
//!   notice travels over the channel. Shards are merged after the barrier.

use crate::barrier::PhaseBarrier;
use crate::error::{Phase, TaskFailure};
use crate::kv::{KeyBound, KeyValue};
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// How mapper output reaches the grouping step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ShuffleStrategy {
    #[default]
    Channel,
    Sharded { shards: usize },
}

/// Order of values inside each key's group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrder {
    /// Whatever order mapper tasks happened to finish in.
    #[default]
    Arrival,
    /// Sorted by originating record index; emit order kept within a record.
    RecordIndex,
}

/// Key to every value emitted for it, built only during shuffle.
#[derive(Clone, Debug)]
pub struct IntermediateGroup<K, V> {
    groups: HashMap<K, Vec<V>>,
    values: usize,
}

impl<K: KeyBound, V> IntermediateGroup<K, V> {
    fn new() -> Self {
        Self {
            groups: HashMap::new(),
            values: 0,
        }
    }

    fn push(&mut self, key: K, value: V) {
        self.groups.entry(key).or_default().push(value);
        self.values += 1;
    }

    fn push_all(&mut self, key: K, values: Vec<V>) {
        self.values += values.len();
        self.groups.entry(key).or_default().extend(values);
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of values across all groups.
    pub fn value_count(&self) -> usize {
        self.values
    }

    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Hand every group over to the reduce phase.
    pub fn into_groups(self) -> Vec<(K, Vec<V>)> {
        self.groups.into_iter().collect()
    }
}

/// What a mapper task publishes: exactly one message per task.
enum MapMessage<K, V> {
    Emitted {
        index: usize,
        records: Vec<KeyValue<K, V>>,
    },
    Inserted {
        count: usize,
    },
    Failed(TaskFailure),
}

/// Map-side records held in one shard, tagged with their record index.
type Shard<K, V> = Mutex<HashMap<K, Vec<(usize, V)>>>;

struct ShardedGroup<K, V> {
    shards: Vec<Shard<K, V>>,
    hasher: RandomState,
}

impl<K: KeyBound, V> ShardedGroup<K, V> {
    fn new(n: usize) -> Self {
        Self {
            shards: (0..n.max(1)).map(|_| Mutex::new(HashMap::new())).collect(),
            hasher: RandomState::new(),
        }
    }

    fn insert(&self, index: usize, records: Vec<KeyValue<K, V>>) {
        for kv in records {
            let slot = (self.hasher.hash_one(&kv.key) as usize) % self.shards.len();
            let mut shard = self.shards[slot]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            shard.entry(kv.key).or_default().push((index, kv.value));
        }
    }

    fn merge_into(self, group: &mut IntermediateGroup<K, V>, order: ValueOrder) {
        for shard in self.shards {
            let shard = shard.into_inner().unwrap_or_else(PoisonError::into_inner);
            for (key, mut tagged) in shard {
                if order == ValueOrder::RecordIndex {
                    // stable: emit order within one record survives
                    tagged.sort_by_key(|(index, _)| *index);
                }
                group.push_all(key, tagged.into_iter().map(|(_, v)| v).collect());
            }
        }
    }
}

/// Result of draining the map phase.
pub struct ShuffleOutput<K, V> {
    pub group: IntermediateGroup<K, V>,
    pub failures: Vec<TaskFailure>,
    /// Map-phase barrier; the driver decides when to close it.
    pub barrier: PhaseBarrier,
    /// Number of key-value records mapper tasks emitted.
    pub emitted: usize,
}

/// Publishing side of the shuffle, shared by reference across mapper tasks.
pub struct ShuffleSink<K, V> {
    tx: Sender<MapMessage<K, V>>,
    rx: Receiver<MapMessage<K, V>>,
    sharded: Option<ShardedGroup<K, V>>,
}

impl<K: KeyBound, V: Send> ShuffleSink<K, V> {
    pub fn new(strategy: ShuffleStrategy) -> Self {
        let (tx, rx) = unbounded();
        let sharded = match strategy {
            ShuffleStrategy::Channel => None,
            ShuffleStrategy::Sharded { shards } => Some(ShardedGroup::new(shards)),
        };
        Self { tx, rx, sharded }
    }

    /// Publish the output of the mapper task for record `index`.
    pub fn publish(&self, index: usize, records: Vec<KeyValue<K, V>>) {
        let msg = match &self.sharded {
            Some(shards) => {
                let count = records.len();
                shards.insert(index, records);
                MapMessage::Inserted { count }
            }
            None => MapMessage::Emitted { index, records },
        };
        self.send(msg);
    }

    /// Publish a failed mapper task in place of its output.
    pub fn fail(&self, failure: TaskFailure) {
        self.send(MapMessage::Failed(failure));
    }

    fn send(&self, msg: MapMessage<K, V>) {
        // the receiver lives in `self`, so this only fails if it was dropped
        if self.tx.send(msg).is_err() {
            warn!("shuffle receiver dropped before map output was published");
        }
    }

    /// Group everything published so far. Call only after every mapper
    /// task has been joined.
    pub fn drain(self, expected: usize, order: ValueOrder) -> ShuffleOutput<K, V> {
        let ShuffleSink { tx, rx, sharded } = self;
        drop(tx);

        let mut barrier = PhaseBarrier::new(Phase::Map, expected);
        let mut group = IntermediateGroup::new();
        let mut failures = Vec::new();
        let mut emitted = 0usize;
        let mut pending: Vec<(usize, Vec<KeyValue<K, V>>)> = Vec::new();

        for msg in rx.iter() {
            barrier.arrive();
            match msg {
                MapMessage::Emitted { index, records } => {
                    emitted += records.len();
                    match order {
                        ValueOrder::Arrival => {
                            for kv in records {
                                group.push(kv.key, kv.value);
                            }
                        }
                        ValueOrder::RecordIndex => pending.push((index, records)),
                    }
                }
                MapMessage::Inserted { count } => emitted += count,
                MapMessage::Failed(f) => failures.push(f),
            }
        }

        if !pending.is_empty() {
            pending.sort_by_key(|(index, _)| *index);
            for (_, records) in pending {
                for kv in records {
                    group.push(kv.key, kv.value);
                }
            }
        }

        if let Some(shards) = sharded {
            shards.merge_into(&mut group, order);
        }

        debug_assert_eq!(group.value_count(), emitted, "shuffle lost or duplicated values");

        ShuffleOutput {
            group,
            failures,
            barrier,
            emitted,
        }
    }
}
