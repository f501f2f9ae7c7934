//! Subcommand implementations.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use tracing::info;

use tissuex_classifier::table::{
    read_abundance_path, read_annotations_path, read_matrix_path, write_matrix, write_records,
};
use tissuex_classifier::{aggregate_medians, ClassificationReport, ExpressionClassifier};
use tissuex_common::ClassifierConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Tsv,
    Json,
}

impl OutputFormat {
    fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Gene × body-part median expression matrix (TSV)
    #[arg(short = 'm', long, value_name = "PATH")]
    pub matrix: PathBuf,

    /// Where to write gene records (stdout when omitted)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write category counts and per-part specific counts as JSON
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    /// Expressed threshold (original units)
    #[arg(long)]
    pub expressed: Option<f64>,

    /// Stable expression threshold (original units)
    #[arg(long)]
    pub stable: Option<f64>,

    /// Specificity index cut-off
    #[arg(long)]
    pub specificity: Option<f64>,
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    /// Gene × sample abundance table (TSV)
    #[arg(short = 'a', long, value_name = "PATH")]
    pub abundance: PathBuf,

    /// Sample annotation table (TSV)
    #[arg(short = 's', long, value_name = "PATH")]
    pub samples: PathBuf,

    /// Median matrix output (TSV)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: PathBuf,

    #[arg(long)]
    pub min_mapping_rate: Option<f64>,

    #[arg(long)]
    pub min_reads: Option<u64>,
}

impl ClassifyArgs {
    /// Flags win over the configuration file.
    pub fn apply(&self, config: &mut ClassifierConfig) {
        if let Some(v) = self.expressed {
            config.thresholds.expressed = v;
        }
        if let Some(v) = self.stable {
            config.thresholds.stable = v;
        }
        if let Some(v) = self.specificity {
            config.thresholds.specificity = v;
        }
        if let Some(f) = self.format {
            config.output.format = f.as_str().to_string();
        }
    }
}

impl AggregateArgs {
    pub fn apply(&self, config: &mut ClassifierConfig) {
        if let Some(v) = self.min_mapping_rate {
            config.sample_filter.min_mapping_rate = v;
        }
        if let Some(v) = self.min_reads {
            config.sample_filter.min_reads = v;
        }
    }
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn write_report(
    out: impl Write,
    report: &ClassificationReport,
    config: &ClassifierConfig,
) -> anyhow::Result<()> {
    match config.output.format.as_str() {
        "json" => serde_json::to_writer_pretty(out, report)?,
        _ => write_records(out, report, config.output.score_precision)?,
    }
    Ok(())
}

pub fn run_classify(args: &ClassifyArgs, mut config: ClassifierConfig) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let matrix = read_matrix_path(&args.matrix)
        .with_context(|| format!("Failed to read matrix {}", args.matrix.display()))?;
    info!(
        "Loaded {} genes × {} body parts from {}",
        matrix.n_genes(),
        matrix.n_parts(),
        args.matrix.display()
    );

    let classifier = ExpressionClassifier::from_config(&config)?;
    let report = classifier.classify(&matrix);

    let mut out = open_output(args.output.as_deref())?;
    write_report(&mut out, &report, &config)?;
    out.flush()?;

    if let Some(path) = &args.summary {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut summary = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut summary, &report.summary())?;
        summary
            .flush()
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }
    Ok(())
}

pub fn run_aggregate(args: &AggregateArgs, mut config: ClassifierConfig) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate()?;

    let abundance = read_abundance_path(&args.abundance)
        .with_context(|| format!("Failed to read abundance table {}", args.abundance.display()))?;
    let annotations = read_annotations_path(&args.samples)
        .with_context(|| format!("Failed to read sample table {}", args.samples.display()))?;

    let matrix = aggregate_medians(&abundance, &annotations, &config.sample_filter)?;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    write_matrix(BufWriter::new(file), &matrix)?;
    info!(
        "Wrote {} genes × {} body parts to {}",
        matrix.n_genes(),
        matrix.n_parts(),
        args.output.display()
    );
    Ok(())
}
