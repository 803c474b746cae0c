//! # ironreduce
//!
//! A **single-process, two-phase map-reduce engine**. Input records are fanned
//! out to concurrent mapper tasks, their key-value output is grouped by key
//! behind a hard completion barrier (the shuffle), and each group is reduced by
//! its own concurrent task. A second barrier guarantees the returned mapping is
//! complete before the caller sees it.
//!
//! ## Quick Start
//!
//! ```
//! use ironreduce::*;
//!
//! # fn main() -> Result<(), PipelineError> {
//! let lines = vec!["The quick fox".to_string(), "the Fox jumps".to_string()];
//!
//! let job = MapReduce::new(WordCountMapper::new(), SumReducer);
//! let counts = job.run(&lines)?;
//!
//! assert_eq!(counts.get(&"the".to_string()), Some(&2));
//! assert_eq!(counts.get(&"jumps".to_string()), Some(&1));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! - [`Mapper`]: one record to zero or more [`KeyValue`]s. Closures
//!   `Fn(&R) -> Vec<KeyValue<K, V>>` implement it directly.
//! - [`Reducer`]: one key and all of its values to a single [`KeyValue`].
//!   Closures `Fn(K, Vec<V>) -> KeyValue<K, O>` implement it directly.
//! - [`MapReduce`]: the driver. Every `run*` call is a fresh computation.
//! - [`Runner`]: how tasks are scheduled and how shuffle behaves.
//!
//! ## Execution Modes
//!
//! - [`ExecMode::PerItem`] (default): one rayon task per record and per key.
//! - [`ExecMode::Pool`]: a dedicated pool of N workers pulling from a shared
//!   queue; caps concurrency for large inputs.
//! - [`ExecMode::Sequential`]: everything inline, in order.
//!
//! All modes produce the same set of results.
//!
//! ## Failures and Cancellation
//!
//! A panicking mapper or reducer is caught inside its task and reported as a
//! [`TaskFailure`] naming the record index or key. [`MapReduce::run`] fails
//! with every failed unit listed; [`MapReduce::run_report`] returns the
//! mapping of the units that succeeded next to the failures. With
//! [`FailurePolicy::FailFast`] the first failure stops scheduling.
//!
//! A [`CancellationToken`] passed to [`MapReduce::run_with_cancel`] stops new
//! tasks from starting and turns the run into [`PipelineError::Cancelled`];
//! a partial mapping is never returned.
//!
//! ## Value Ordering
//!
//! Values reach a reducer in arrival order by default, which varies between
//! runs. Reducers that are not commutative should run with
//! [`ValueOrder::RecordIndex`], which sorts each group by record index.
//!
//! ## Module Overview
//!
//! - [`kv`] - key-value records and the result mapping
//! - [`functions`] - mapper/reducer traits and stock reducers
//! - [`shuffle`] - barrier-guarded grouping, channel or sharded
//! - [`runner`] - task scheduling and the two-phase execution
//! - [`pipeline`] - the `MapReduce` driver
//! - [`wordcount`] - the reference word-frequency job
//! - [`io`] - line loading and result presentation
//! - [`config`] - runner configuration files
//! - [`metrics`] - run counters and phase timings

pub mod barrier;
pub mod cancel;
pub mod config;
pub mod error;
pub mod functions;
pub mod io;
pub mod kv;
pub mod metrics;
pub mod pipeline;
pub mod runner;
pub mod shuffle;
pub mod testing;
pub mod wordcount;

pub use cancel::CancellationToken;
pub use config::RunnerConfig;
pub use error::{FailedUnit, Phase, PipelineError, TaskFailure};
pub use functions::{CountReducer, Mapper, MaxReducer, Reducer, SumReducer};
pub use kv::{KeyBound, KeyValue, ResultMapping};
pub use pipeline::{JobReport, MapReduce};
pub use runner::{ExecMode, FailurePolicy, Runner};
pub use shuffle::{IntermediateGroup, ShuffleStrategy, ValueOrder};
pub use wordcount::{WordCountMapper, word_count, word_count_job};
