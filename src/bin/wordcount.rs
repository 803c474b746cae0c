use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ironreduce::io::{read_lines, render_frequencies};
use ironreduce::metrics::MetricsCollector;
use ironreduce::runner::{default_shards, default_workers};
use ironreduce::{ExecMode, RunnerConfig, ShuffleStrategy, word_count_job};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    PerItem,
    Pool,
    Sequential,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Shuffle {
    Channel,
    Sharded,
}

/// Count word frequencies in a text file with the map-reduce engine.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Text file to count; blank lines are skipped
    input: PathBuf,

    /// Runner configuration (JSON); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Worker threads; needs pool mode from `--mode pool` or the config
    #[arg(short, long)]
    workers: Option<usize>,

    #[arg(long, value_enum)]
    shuffle: Option<Shuffle>,

    /// Shard count; needs the sharded shuffle from `--shuffle sharded` or the config
    #[arg(long)]
    shards: Option<usize>,

    /// Write run metrics as JSON to this file
    #[arg(long)]
    metrics: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RunnerConfig::from_json_file(path)?,
        None => RunnerConfig::default(),
    };
    match cli.mode {
        Some(Mode::PerItem) => config.mode = ExecMode::PerItem,
        Some(Mode::Sequential) => config.mode = ExecMode::Sequential,
        Some(Mode::Pool) if !matches!(config.mode, ExecMode::Pool { .. }) => {
            config.mode = ExecMode::Pool {
                workers: default_workers(),
            }
        }
        _ => {}
    }
    if let Some(workers) = cli.workers {
        config.set_workers(workers).context("--workers")?;
    }
    match cli.shuffle {
        Some(Shuffle::Channel) => config.shuffle = ShuffleStrategy::Channel,
        Some(Shuffle::Sharded) if !matches!(config.shuffle, ShuffleStrategy::Sharded { .. }) => {
            config.shuffle = ShuffleStrategy::Sharded {
                shards: default_shards(),
            }
        }
        _ => {}
    }
    if let Some(shards) = cli.shards {
        config.set_shards(shards).context("--shards")?;
    }
    config.validate()?;

    let lines = read_lines(&cli.input)?;
    info!(lines = lines.len(), input = %cli.input.display(), "loaded input");

    let metrics = MetricsCollector::new();
    let job = word_count_job(config.into_runner().with_metrics(metrics.clone()));
    let counts = job
        .run(&lines)
        .with_context(|| format!("counting words in {}", cli.input.display()))?;

    print!("{}", render_frequencies(&counts));

    if let Some(path) = &cli.metrics {
        metrics.save_to_file(path)?;
        info!(path = %path.display(), "metrics written");
    }
    Ok(())
}
