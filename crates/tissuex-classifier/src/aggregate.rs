//! Sample retention and per-body-part median aggregation.
//!
//! Turns a gene × sample abundance table (one column per sequencing run)
//! into the gene × body-part median matrix the classifier consumes. Runs
//! that fail the quality gate are dropped before any median is taken.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tissuex_common::{Result, SampleFilterConfig, TissuexError};

use crate::matrix::ExpressionMatrix;

/// Metadata of one sequencing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleAnnotation {
    pub sample: String,
    pub body_part: String,
    /// Fraction of reads assigned by the quantifier
    pub mapping_rate: f64,
    /// Reads left after trimming
    pub num_reads: u64,
}

impl SampleAnnotation {
    pub fn passes(&self, filter: &SampleFilterConfig) -> bool {
        self.mapping_rate >= filter.min_mapping_rate && self.num_reads >= filter.min_reads
    }
}

/// Gene × sample abundance estimates (e.g. TPM).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleAbundance {
    genes: Vec<String>,
    samples: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl SampleAbundance {
    pub fn new(genes: Vec<String>, samples: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = samples.iter().find(|s| !seen.insert(s.as_str())) {
            return Err(TissuexError::invalid_input(format!("duplicate sample identifier '{dup}'")));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = genes.iter().find(|g| !seen.insert(g.as_str())) {
            return Err(TissuexError::invalid_input(format!("duplicate gene identifier '{dup}'")));
        }
        if rows.len() != genes.len() {
            return Err(TissuexError::invalid_input(format!(
                "{} genes but {} abundance rows",
                genes.len(),
                rows.len()
            )));
        }
        for (gene, row) in genes.iter().zip(&rows) {
            if row.len() != samples.len() {
                return Err(TissuexError::invalid_input(format!(
                    "gene '{}' has {} values for {} samples",
                    gene,
                    row.len(),
                    samples.len()
                )));
            }
            if row.iter().any(|v| *v < 0.0) {
                return Err(TissuexError::invalid_input(format!(
                    "negative abundance for gene '{gene}'"
                )));
            }
        }
        Ok(Self { genes, samples, rows })
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }
}

/// Annotations of the runs that pass `filter`, in input order.
pub fn retained_samples<'a>(
    annotations: &'a [SampleAnnotation],
    filter: &SampleFilterConfig,
) -> Vec<&'a SampleAnnotation> {
    annotations
        .iter()
        .filter(|a| {
            let keep = a.passes(filter);
            if !keep {
                debug!(
                    sample = %a.sample,
                    mapping_rate = a.mapping_rate,
                    num_reads = a.num_reads,
                    "sample dropped by quality filter"
                );
            }
            keep
        })
        .collect()
}

/// Median of the finite values; mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        Some((finite[mid - 1] + finite[mid]) / 2.0)
    } else {
        Some(finite[mid])
    }
}

/// Per-body-part medians over the retained samples.
///
/// Body parts appear in order of first retained annotation. A gene with no
/// finite value in some body part gets `NaN` there.
pub fn aggregate_medians(
    abundance: &SampleAbundance,
    annotations: &[SampleAnnotation],
    filter: &SampleFilterConfig,
) -> Result<ExpressionMatrix> {
    let column: HashMap<&str, usize> = abundance
        .samples
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let mut annotated = HashSet::new();
    for a in annotations {
        if !column.contains_key(a.sample.as_str()) {
            return Err(TissuexError::invalid_input(format!(
                "annotated sample '{}' is not in the abundance table",
                a.sample
            )));
        }
        if !annotated.insert(a.sample.as_str()) {
            return Err(TissuexError::invalid_input(format!(
                "sample '{}' is annotated more than once",
                a.sample
            )));
        }
    }
    if let Some(missing) = abundance.samples.iter().find(|s| !annotated.contains(s.as_str())) {
        return Err(TissuexError::invalid_input(format!(
            "sample '{missing}' has no annotation"
        )));
    }

    let retained = retained_samples(annotations, filter);

    // body part -> abundance columns
    let mut body_parts: Vec<String> = Vec::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for a in &retained {
        let g = match body_parts.iter().position(|p| p == &a.body_part) {
            Some(g) => g,
            None => {
                body_parts.push(a.body_part.clone());
                groups.push(Vec::new());
                body_parts.len() - 1
            }
        };
        groups[g].push(column[a.sample.as_str()]);
    }

    info!(
        samples = annotations.len(),
        retained = retained.len(),
        body_parts = body_parts.len(),
        "aggregating replicate medians"
    );

    let mut rows = Vec::with_capacity(abundance.rows.len());
    let mut buf = Vec::new();
    for row in &abundance.rows {
        let mut medians = Vec::with_capacity(groups.len());
        for cols in &groups {
            buf.clear();
            buf.extend(cols.iter().map(|&c| row[c]));
            medians.push(median(&buf).unwrap_or(f64::NAN));
        }
        rows.push(medians);
    }

    ExpressionMatrix::new(abundance.genes.clone(), body_parts, rows)
}
