use std::fmt::{self, Display};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use fileargs::logging::init_tracing;
use fileargs::{
    CachedFileArgumentParser, ClapParser, FallbackPolicy, FileArgumentParser, Reparse,
    SourceConfig,
};

/// Poll an argument file and print every parse.
#[derive(Parser, Debug)]
#[command(name = "fileargs-poll", version, about)]
struct Cli {
    /// Argument file, one token per line
    #[arg(long, value_name = "PATH", required_unless_present = "config")]
    args_file: Option<PathBuf>,

    /// TOML file describing the argument source
    #[arg(long, value_name = "PATH", conflicts_with = "args_file")]
    config: Option<PathBuf>,

    /// Use default worker arguments when the file is missing
    #[arg(long)]
    fallback: bool,

    /// Re-parse only when the file's modification time changes
    #[arg(long)]
    cached: bool,

    /// Number of polls before exiting
    #[arg(long, default_value_t = 1)]
    count: usize,

    /// Delay between polls in milliseconds
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,
}

/// Arguments carried by the polled file.
#[derive(Parser, Debug)]
#[command(name = "worker")]
struct WorkerArgs {
    #[arg(long, default_value_t = 1)]
    threads: u32,

    #[arg(long, default_value = "default")]
    label: String,

    #[arg(long)]
    verbose: bool,
}

impl Display for WorkerArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "threads={} label={:?} verbose={}",
            self.threads, self.label, self.verbose
        )
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SourceConfig::load_from(path)?,
        None => SourceConfig::default(),
    };
    if let Some(path) = cli.args_file {
        config.path = path;
    }
    if cli.fallback {
        config.fallback = FallbackPolicy::UseProcessArgs;
    }
    config.cached |= cli.cached;

    // The host's own flags are not worker flags; fall back to defaults only.
    let parser = ClapParser::<WorkerArgs>::new().with_process_args(["worker"]);
    let interval = Duration::from_millis(cli.interval_ms);

    tracing::info!(
        path = %config.path.display(),
        fallback = ?config.fallback,
        cached = config.cached,
        "Polling argument file"
    );

    if config.cached {
        let mut reader = CachedFileArgumentParser::from_source(parser, config.to_source());
        poll(&mut reader, cli.count, interval)
    } else {
        let mut reader = FileArgumentParser::from_source(parser, config.to_source());
        poll(&mut reader, cli.count, interval)
    }
}

fn poll<R>(reader: &mut R, count: usize, interval: Duration) -> anyhow::Result<()>
where
    R: Reparse,
    R::Item: Display,
    R::Error: std::error::Error + Send + Sync + 'static,
{
    for (i, result) in reader.continuous().take(count).enumerate() {
        let args = result.with_context(|| format!("Poll {} failed", i + 1))?;
        println!("{}", args);
        if i + 1 < count {
            thread::sleep(interval);
        }
    }
    Ok(())
}
