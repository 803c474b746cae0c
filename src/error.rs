//! Error taxonomy for pipeline runs.

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Which phase of a run an error or failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Map,
    Reduce,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Map => write!(f, "map"),
            Phase::Reduce => write!(f, "reduce"),
        }
    }
}

/// The unit of work a failed task was processing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FailedUnit {
    /// Index of the input record handed to the mapper.
    Record(usize),
    /// Debug rendering of the key handed to the reducer.
    Key(String),
}

impl fmt::Display for FailedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedUnit::Record(i) => write!(f, "record #{i}"),
            FailedUnit::Key(k) => write!(f, "key {k}"),
        }
    }
}

/// A mapper or reducer invocation that panicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskFailure {
    pub phase: Phase,
    pub unit: FailedUnit,
    pub message: String,
}

impl TaskFailure {
    pub(crate) fn record(index: usize, payload: Box<dyn Any + Send>) -> Self {
        Self {
            phase: Phase::Map,
            unit: FailedUnit::Record(index),
            message: panic_message(payload),
        }
    }

    pub(crate) fn key<K: fmt::Debug>(key: &K, payload: Box<dyn Any + Send>) -> Self {
        Self {
            phase: Phase::Reduce,
            unit: FailedUnit::Key(format!("{key:?}")),
            message: panic_message(payload),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} task for {} failed: {}", self.phase, self.unit, self.message)
    }
}

impl std::error::Error for TaskFailure {}

/// Errors surfaced by [`crate::MapReduce`] entry points.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline run was cancelled")]
    Cancelled,

    #[error("{} task(s) failed: {}", .0.len(), summarize(.0))]
    TaskFailures(Vec<TaskFailure>),

    #[error("{phase} barrier incomplete: expected {expected} task(s), {arrived} arrived")]
    BarrierIncomplete {
        phase: Phase,
        expected: usize,
        arrived: usize,
    },

    #[error("reducers emitted key {0} more than once")]
    DuplicateResultKey(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl PipelineError {
    /// Failures carried by this error, empty for other variants.
    pub fn failures(&self) -> &[TaskFailure] {
        match self {
            PipelineError::TaskFailures(f) => f,
            _ => &[],
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for PipelineError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        PipelineError::ThreadPool(e.to_string())
    }
}

fn summarize(failures: &[TaskFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Best-effort text of a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(s) => *s,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(s) => (*s).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}
