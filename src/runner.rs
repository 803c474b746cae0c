use crate::barrier::PhaseBarrier;
use crate::cancel::CancellationToken;
use crate::error::{Phase, PipelineError, TaskFailure};
use crate::functions::{Mapper, Reducer};
use crate::kv::{KeyBound, KeyValue, ResultMapping};
use crate::metrics::{JobStats, MetricsCollector};
use crate::pipeline::JobReport;
use crate::shuffle::{ShuffleOutput, ShuffleSink, ShuffleStrategy, ValueOrder};
use crossbeam_channel::unbounded;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;
use tracing::{debug, info, warn};

/// How mapper and reducer tasks are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExecMode {
    /// Every unit runs inline on the calling thread, in input order.
    Sequential,
    /// One rayon task per record (map) and per key (reduce) on the global pool.
    #[default]
    PerItem,
    /// A dedicated pool of `workers` threads pulling units from a shared queue.
    Pool { workers: usize },
}

/// What to do when a mapper or reducer panics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Let every task run and report all failed units together.
    #[default]
    CollectAll,
    /// Stop scheduling new tasks on the first failure.
    FailFast,
}

/// Executes one map-reduce job.
#[derive(Clone)]
pub struct Runner {
    pub mode: ExecMode,
    pub shuffle: ShuffleStrategy,
    pub value_order: ValueOrder,
    pub failure_policy: FailurePolicy,
    pub metrics: Option<MetricsCollector>,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::PerItem,
            shuffle: ShuffleStrategy::Channel,
            value_order: ValueOrder::Arrival,
            failure_policy: FailurePolicy::CollectAll,
            metrics: None,
        }
    }
}

/// Default worker count for [`ExecMode::Pool`].
pub fn default_workers() -> usize {
    num_cpus::get().max(2)
}

/// Default shard count for [`ShuffleStrategy::Sharded`].
pub fn default_shards() -> usize {
    4 * num_cpus::get().max(2)
}

enum ReduceMessage<K, O> {
    Reduced(KeyValue<K, O>),
    Failed(TaskFailure),
}

impl Runner {
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
    }

    /// Bounded pool; `None` sizes it from the CPU count.
    pub fn pool(workers: Option<usize>) -> Self {
        Self {
            mode: ExecMode::Pool {
                workers: workers.unwrap_or_else(default_workers),
            },
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: ShuffleStrategy) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn with_value_order(mut self, order: ValueOrder) -> Self {
        self.value_order = order;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run map, shuffle and reduce over `records`.
    ///
    /// Returns only after every task of both phases has been joined. Failed
    /// units are listed in the report under [`FailurePolicy::CollectAll`];
    /// under [`FailurePolicy::FailFast`] the first failure aborts the run.
    pub fn execute<R, K, V, O, M, Rd>(
        &self,
        mapper: &M,
        reducer: &Rd,
        records: &[R],
        cancel: &CancellationToken,
    ) -> Result<JobReport<K, O>, PipelineError>
    where
        R: Sync,
        K: KeyBound,
        V: Send,
        O: Send,
        M: Mapper<R, K, V> + ?Sized,
        Rd: Reducer<K, V, O> + ?Sized,
    {
        if let Some(m) = &self.metrics {
            m.record_start();
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let fail_fast = self.failure_policy == FailurePolicy::FailFast;
        // cancelled by the caller, or by us on a fail-fast error
        let tasks = cancel.child_token();
        let pool = self.build_pool()?;
        let mut stats = JobStats {
            records: records.len(),
            ..Default::default()
        };

        info!(records = records.len(), mode = ?self.mode, shuffle = ?self.shuffle, "starting map phase");
        let started = Instant::now();
        let sink = ShuffleSink::new(self.shuffle);
        let units: Vec<&R> = records.iter().collect();
        self.fan_out(pool.as_ref(), units, &tasks, |index, record| {
            match catch_unwind(AssertUnwindSafe(|| mapper.map(record))) {
                Ok(out) => sink.publish(index, out),
                Err(payload) => {
                    let failure = TaskFailure::record(index, payload);
                    warn!(%failure, "mapper task failed");
                    if fail_fast {
                        tasks.cancel();
                    }
                    sink.fail(failure);
                }
            }
        });
        stats.map_elapsed = started.elapsed();
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let started = Instant::now();
        let ShuffleOutput {
            group,
            mut failures,
            barrier,
            emitted,
        } = sink.drain(records.len(), self.value_order);
        if fail_fast && !failures.is_empty() {
            return Err(PipelineError::TaskFailures(failures));
        }
        barrier.close()?;
        stats.emitted = emitted;
        stats.distinct_keys = group.len();
        stats.shuffle_elapsed = started.elapsed();
        debug!(keys = group.len(), values = emitted, "shuffle complete");

        let started = Instant::now();
        let keys = group.len();
        let (tx, rx) = unbounded::<ReduceMessage<K, O>>();
        self.fan_out(pool.as_ref(), group.into_groups(), &tasks, |_, (key, values)| {
            let unit = key.clone();
            let msg = match catch_unwind(AssertUnwindSafe(|| reducer.reduce(key, values))) {
                Ok(kv) => ReduceMessage::Reduced(kv),
                Err(payload) => {
                    let failure = TaskFailure::key(&unit, payload);
                    warn!(%failure, "reducer task failed");
                    if fail_fast {
                        tasks.cancel();
                    }
                    ReduceMessage::Failed(failure)
                }
            };
            if tx.send(msg).is_err() {
                warn!("result collector dropped before reducer output was published");
            }
        });
        drop(tx);
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let mut barrier = PhaseBarrier::new(Phase::Reduce, keys);
        let mut mapping = ResultMapping::with_capacity(keys);
        let mut duplicate = None;
        for msg in rx.iter() {
            barrier.arrive();
            match msg {
                ReduceMessage::Reduced(kv) => {
                    if let Err(key) = mapping.insert_unique(kv) {
                        duplicate.get_or_insert(key);
                    }
                }
                ReduceMessage::Failed(f) => failures.push(f),
            }
        }
        if fail_fast && !failures.is_empty() {
            return Err(PipelineError::TaskFailures(failures));
        }
        if let Some(key) = duplicate {
            return Err(PipelineError::DuplicateResultKey(format!("{key:?}")));
        }
        barrier.close()?;
        stats.reduce_elapsed = started.elapsed();
        stats.keys_reduced = mapping.len();
        stats.failed_tasks = failures.len();

        if let Some(m) = &self.metrics {
            stats.record_into(m);
            m.record_end();
        }
        info!(
            keys = mapping.len(),
            failed = failures.len(),
            "map-reduce run finished"
        );

        Ok(JobReport {
            mapping,
            failures,
            stats,
        })
    }

    fn build_pool(&self) -> Result<Option<ThreadPool>, PipelineError> {
        match self.mode {
            ExecMode::Pool { workers } => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(workers.max(1))
                    .thread_name(|i| format!("ironreduce-worker-{i}"))
                    .build()?;
                Ok(Some(pool))
            }
            ExecMode::Sequential | ExecMode::PerItem => Ok(None),
        }
    }

    /// Run `task` once per unit and join all of them before returning.
    ///
    /// Nothing new starts once `token` is cancelled; tasks already running
    /// are left to finish.
    fn fan_out<T, F>(
        &self,
        pool: Option<&ThreadPool>,
        units: Vec<T>,
        token: &CancellationToken,
        task: F,
    ) where
        T: Send,
        F: Fn(usize, T) + Sync,
    {
        let task = &task;
        match (self.mode, pool) {
            (ExecMode::Pool { .. }, Some(pool)) => {
                let (work_tx, work_rx) = unbounded::<(usize, T)>();
                for unit in units.into_iter().enumerate() {
                    if work_tx.send(unit).is_err() {
                        break;
                    }
                }
                drop(work_tx);

                let workers = pool.current_num_threads();
                pool.scope(|s| {
                    for _ in 0..workers {
                        let work_rx = work_rx.clone();
                        s.spawn(move |_| {
                            for (index, unit) in work_rx.iter() {
                                if token.is_cancelled() {
                                    break;
                                }
                                task(index, unit);
                            }
                        });
                    }
                });
            }
            (ExecMode::Sequential, _) => {
                for (index, unit) in units.into_iter().enumerate() {
                    if token.is_cancelled() {
                        break;
                    }
                    task(index, unit);
                }
            }
            // per-item, or a pool mode handed no pool
            _ => rayon::scope(|s| {
                for (index, unit) in units.into_iter().enumerate() {
                    if token.is_cancelled() {
                        break;
                    }
                    s.spawn(move |_| {
                        if !token.is_cancelled() {
                            task(index, unit);
                        }
                    });
                }
            }),
        }
    }
}
