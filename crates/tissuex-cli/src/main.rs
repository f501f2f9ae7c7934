//! tissuex — Tissue-specificity classification of plant gene expression.
//! Entry point for the command-line binary.

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{AggregateArgs, ClassifyArgs};

#[derive(Debug, Parser)]
#[command(name = "tissuex", version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Worker threads for per-gene scoring
    #[arg(short = 't', long, global = true, value_name = "THREADS")]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify genes of a gene × body-part median matrix
    Classify(ClassifyArgs),
    /// Build the median matrix from per-sample abundances
    Aggregate(AggregateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tissuex=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let start = std::time::Instant::now();
    info!("tissuex {}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load(cli.config.as_deref())?;
    if cli.threads.is_some() {
        config.execution.threads = cli.threads;
    }
    if let Some(n) = config.execution.threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
    }

    match cli.command {
        Command::Classify(args) => commands::run_classify(&args, config)?,
        Command::Aggregate(args) => commands::run_aggregate(&args, config)?,
    }

    info!("Elapsed time: {:.3?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tissuex", "classify", "--matrix", "medians.tsv", "--threads", "4", "--specificity", "0.9",
        ])
        .unwrap();
        assert_eq!(cli.threads, Some(4));
        match cli.command {
            Command::Classify(args) => {
                assert_eq!(args.matrix, PathBuf::from("medians.tsv"));
                assert_eq!(args.specificity, Some(0.9));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
