//! Word frequency counting, the reference use of the engine.

use crate::error::PipelineError;
use crate::functions::{Mapper, SumReducer};
use crate::kv::{KeyValue, ResultMapping};
use crate::pipeline::MapReduce;
use crate::runner::Runner;
use regex::Regex;

/// Emits `(word, 1)` for every alphabetic word of a line.
///
/// Runs of anything other than ASCII letters act as separators, and words
/// are lowercased, so `"The Fox's den, 2nd"` yields `the`, `fox`, `s`,
/// `den`, `nd`.
#[derive(Clone, Debug)]
pub struct WordCountMapper {
    separators: Regex,
}

impl WordCountMapper {
    pub fn new() -> Self {
        Self {
            separators: Regex::new("[^a-zA-Z]+").expect("valid separator pattern"),
        }
    }

    pub fn tokenize(&self, line: &str) -> Vec<String> {
        self.separators
            .split(line)
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect()
    }
}

impl Default for WordCountMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>> Mapper<S, String, u64> for WordCountMapper {
    fn map(&self, record: &S) -> Vec<KeyValue<String, u64>> {
        self.tokenize(record.as_ref())
            .into_iter()
            .map(|word| KeyValue::new(word, 1))
            .collect()
    }
}

/// A ready-made word-count job.
pub fn word_count_job(runner: Runner) -> MapReduce<WordCountMapper, SumReducer> {
    MapReduce::new(WordCountMapper::new(), SumReducer).with_runner(runner)
}

/// Count word frequencies across `lines` with the default runner.
///
/// ```
/// let counts = ironreduce::word_count(&["The quick fox", "the Fox jumps"]).unwrap();
/// assert_eq!(counts.get(&"fox".to_string()), Some(&2));
/// ```
pub fn word_count<S: AsRef<str> + Sync>(
    lines: &[S],
) -> Result<ResultMapping<String, u64>, PipelineError> {
    word_count_job(Runner::default()).run(lines)
}
