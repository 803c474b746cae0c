//! The pipeline driver: a mapper, a reducer and the runner that executes them.

use crate::cancel::CancellationToken;
use crate::error::{PipelineError, TaskFailure};
use crate::functions::{Mapper, Reducer};
use crate::kv::{KeyBound, ResultMapping};
use crate::metrics::JobStats;
use crate::runner::Runner;

/// Outcome of a run in partial-failure mode.
///
/// `mapping` holds every unit that succeeded; `failures` names every record
/// or key whose task panicked. Keys whose reducer failed are absent from the
/// mapping, and values from failed mapper tasks never reached a reducer.
#[derive(Debug)]
pub struct JobReport<K, O> {
    pub mapping: ResultMapping<K, O>,
    pub failures: Vec<TaskFailure>,
    pub stats: JobStats,
}

impl<K, O> JobReport<K, O> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn the report into a plain result, failing on any task failure.
    pub fn into_result(self) -> Result<ResultMapping<K, O>, PipelineError> {
        if self.failures.is_empty() {
            Ok(self.mapping)
        } else {
            Err(PipelineError::TaskFailures(self.failures))
        }
    }
}

/// A map-reduce job.
///
/// Each `run*` call is an independent computation over the records it is
/// given; nothing is carried over between calls.
#[derive(Clone)]
pub struct MapReduce<M, Rd> {
    mapper: M,
    reducer: Rd,
    runner: Runner,
}

impl<M, Rd> MapReduce<M, Rd> {
    pub fn new(mapper: M, reducer: Rd) -> Self {
        Self {
            mapper,
            reducer,
            runner: Runner::default(),
        }
    }

    #[must_use]
    pub fn with_runner(mut self, runner: Runner) -> Self {
        self.runner = runner;
        self
    }

    /// Run the job to completion.
    ///
    /// # Errors
    ///
    /// [`PipelineError::TaskFailures`] if any mapper or reducer panicked,
    /// listing every failed unit.
    pub fn run<R, K, V, O>(&self, records: &[R]) -> Result<ResultMapping<K, O>, PipelineError>
    where
        R: Sync,
        K: KeyBound,
        V: Send,
        O: Send,
        M: Mapper<R, K, V>,
        Rd: Reducer<K, V, O>,
    {
        self.run_with_cancel(records, &CancellationToken::new())
    }

    /// Like [`run`](Self::run), aborting with [`PipelineError::Cancelled`]
    /// once `cancel` is triggered.
    pub fn run_with_cancel<R, K, V, O>(
        &self,
        records: &[R],
        cancel: &CancellationToken,
    ) -> Result<ResultMapping<K, O>, PipelineError>
    where
        R: Sync,
        K: KeyBound,
        V: Send,
        O: Send,
        M: Mapper<R, K, V>,
        Rd: Reducer<K, V, O>,
    {
        self.run_report_with_cancel(records, cancel)?.into_result()
    }

    /// Run in partial-failure mode: failed units are reported next to the
    /// mapping built from the units that succeeded.
    pub fn run_report<R, K, V, O>(&self, records: &[R]) -> Result<JobReport<K, O>, PipelineError>
    where
        R: Sync,
        K: KeyBound,
        V: Send,
        O: Send,
        M: Mapper<R, K, V>,
        Rd: Reducer<K, V, O>,
    {
        self.run_report_with_cancel(records, &CancellationToken::new())
    }

    pub fn run_report_with_cancel<R, K, V, O>(
        &self,
        records: &[R],
        cancel: &CancellationToken,
    ) -> Result<JobReport<K, O>, PipelineError>
    where
        R: Sync,
        K: KeyBound,
        V: Send,
        O: Send,
        M: Mapper<R, K, V>,
        Rd: Reducer<K, V, O>,
    {
        self.runner
            .execute(&self.mapper, &self.reducer, records, cancel)
    }
}
