//! Runner configuration loaded from JSON.
//!
//! Every field is optional; missing fields take the [`Runner::default`]
//! values. Example:
//!
//! ```json
//! {
//!   "mode": { "kind": "pool", "workers": 8 },
//!   "shuffle": { "kind": "sharded", "shards": 32 },
//!   "value_order": "record_index",
//!   "failure_policy": "fail_fast"
//! }
//! ```

use crate::runner::{ExecMode, FailurePolicy, Runner};
use crate::shuffle::{ShuffleStrategy, ValueOrder};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    pub mode: ExecMode,
    pub shuffle: ShuffleStrategy,
    pub value_order: ValueOrder,
    pub failure_policy: FailurePolicy,
}

impl RunnerConfig {
    /// Parse a config from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: RunnerConfig = serde_json::from_str(s).context("parsing runner config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading runner config {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Reject sizes that can never schedule work.
    pub fn validate(&self) -> Result<()> {
        if let ExecMode::Pool { workers: 0 } = self.mode {
            bail!("pool mode needs at least one worker");
        }
        if let ShuffleStrategy::Sharded { shards: 0 } = self.shuffle {
            bail!("sharded shuffle needs at least one shard");
        }
        Ok(())
    }

    /// Override the worker count of a pool-mode config.
    ///
    /// # Errors
    ///
    /// Fails if the config is not in pool mode.
    pub fn set_workers(&mut self, workers: usize) -> Result<()> {
        match &mut self.mode {
            ExecMode::Pool { workers: w } => {
                *w = workers;
                Ok(())
            }
            other => bail!("a worker count needs pool mode, config selects {other:?}"),
        }
    }

    /// Override the shard count of a sharded-shuffle config.
    ///
    /// # Errors
    ///
    /// Fails if the config does not use the sharded shuffle.
    pub fn set_shards(&mut self, shards: usize) -> Result<()> {
        match &mut self.shuffle {
            ShuffleStrategy::Sharded { shards: n } => {
                *n = shards;
                Ok(())
            }
            other => bail!("a shard count needs the sharded shuffle, config selects {other:?}"),
        }
    }

    pub fn into_runner(self) -> Runner {
        Runner {
            mode: self.mode,
            shuffle: self.shuffle,
            value_order: self.value_order,
            failure_policy: self.failure_policy,
            metrics: None,
        }
    }
}

impl From<RunnerConfig> for Runner {
    fn from(cfg: RunnerConfig) -> Self {
        cfg.into_runner()
    }
}
