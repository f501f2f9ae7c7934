//! Expression category assignment.
//!
//! A gene is `Null` iff its value is ≤ the expressed threshold in every body
//! part. `Null` genes are not emitted as records; the report lists them by
//! identifier in `null_genes`. Every other gene yields one [`GeneRecord`]:
//!
//! 1. no stably expressed part → `Weak`
//! 2. tau below the specificity cut-off → `Broad`
//! 3. otherwise → `Specific`, attributed to every stably expressed part

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tissuex_common::{ClassifierConfig, Result, ThresholdConfig};

use crate::matrix::ExpressionMatrix;
use crate::specificity::{log_expression, tau_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpressionCategory {
    Null,
    Weak,
    Broad,
    Specific,
}

impl ExpressionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpressionCategory::Null => "Null",
            ExpressionCategory::Weak => "Weak",
            ExpressionCategory::Broad => "Broad",
            ExpressionCategory::Specific => "Specific",
        }
    }
}

impl fmt::Display for ExpressionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of one gene that passed the `Null` filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub gene: String,
    pub score: f64,
    pub category: ExpressionCategory,
    /// Stably expressed body parts; empty unless `category` is `Specific`.
    pub specific_parts: Vec<String>,
}

/// Apply the categorization rule to one gene's original values and tau.
pub fn categorize(values: &[f64], score: f64, thresholds: &ThresholdConfig) -> ExpressionCategory {
    let n_expressed = values.iter().filter(|&&v| thresholds.is_expressed(v)).count();
    let n_stable = values.iter().filter(|&&v| thresholds.is_stable(v)).count();

    if n_expressed == 0 {
        ExpressionCategory::Null
    } else if n_stable == 0 {
        ExpressionCategory::Weak
    } else if score < thresholds.specificity {
        ExpressionCategory::Broad
    } else {
        ExpressionCategory::Specific
    }
}

/// Body parts whose original value is above the stable threshold.
pub fn stable_parts(values: &[f64], body_parts: &[String], thresholds: &ThresholdConfig) -> Vec<String> {
    values
        .iter()
        .zip(body_parts)
        .filter(|(v, _)| thresholds.is_stable(**v))
        .map(|(_, part)| part.clone())
        .collect()
}

enum GeneOutcome {
    Excluded,
    Null,
    Emitted(GeneRecord),
}

// ── Classifier ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExpressionClassifier {
    thresholds: ThresholdConfig,
    parallel: bool,
}

impl Default for ExpressionClassifier {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            parallel: false,
        }
    }
}

impl ExpressionClassifier {
    pub fn new(thresholds: ThresholdConfig) -> Result<Self> {
        thresholds.validate()?;
        Ok(Self { thresholds, parallel: false })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self::new(config.thresholds)?.with_parallel(config.execution.parallel))
    }

    /// Score genes on the rayon pool. Output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Classify every gene of `matrix`. Records keep the matrix row order.
    pub fn classify(&self, matrix: &ExpressionMatrix) -> ClassificationReport {
        let n = matrix.n_genes();
        let outcomes: Vec<GeneOutcome> = if self.parallel {
            (0..n).into_par_iter().map(|i| self.evaluate(matrix, i)).collect()
        } else {
            (0..n).map(|i| self.evaluate(matrix, i)).collect()
        };

        let mut report = ClassificationReport {
            body_parts: matrix.body_parts().to_vec(),
            records: Vec::new(),
            null_genes: Vec::new(),
            excluded_genes: Vec::new(),
        };
        for (gene, outcome) in matrix.genes().iter().zip(outcomes) {
            match outcome {
                GeneOutcome::Excluded => {
                    debug!(gene = %gene, "excluded: missing or non-finite expression value");
                    report.excluded_genes.push(gene.clone());
                }
                GeneOutcome::Null => report.null_genes.push(gene.clone()),
                GeneOutcome::Emitted(record) => report.records.push(record),
            }
        }

        let counts = report.category_counts();
        info!(
            genes = n,
            body_parts = matrix.n_parts(),
            specific = counts.specific,
            broad = counts.broad,
            weak = counts.weak,
            null = counts.null,
            excluded = counts.excluded,
            "classification complete"
        );
        report
    }

    fn evaluate(&self, matrix: &ExpressionMatrix, i: usize) -> GeneOutcome {
        if !matrix.is_complete(i) {
            return GeneOutcome::Excluded;
        }
        let values = matrix.row(i);
        let logged: Vec<f64> = values.iter().copied().map(log_expression).collect();
        let score = tau_index(&logged);

        let category = categorize(values, score, &self.thresholds);
        let specific_parts = match category {
            ExpressionCategory::Null => return GeneOutcome::Null,
            ExpressionCategory::Specific => {
                let parts = stable_parts(values, matrix.body_parts(), &self.thresholds);
                debug_assert!(!parts.is_empty(), "Specific gene without a stable part");
                parts
            }
            _ => Vec::new(),
        };

        GeneOutcome::Emitted(GeneRecord {
            gene: matrix.genes()[i].clone(),
            score,
            category,
            specific_parts,
        })
    }
}

/// Classify with the default policy thresholds, sequentially.
pub fn classify(matrix: &ExpressionMatrix) -> ClassificationReport {
    ExpressionClassifier::default().classify(matrix)
}

// ── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub body_parts: Vec<String>,
    pub records: Vec<GeneRecord>,
    pub null_genes: Vec<String>,
    /// Genes dropped for missing or non-finite values.
    pub excluded_genes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub null: usize,
    pub weak: usize,
    pub broad: usize,
    pub specific: usize,
    pub excluded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub counts: CategoryCounts,
    /// Number of `Specific` genes attributed to each body part.
    pub specific_per_part: BTreeMap<String, usize>,
}

impl ClassificationReport {
    /// Single lookup by scan. Use [`ClassificationReport::index`] when
    /// looking up many genes.
    pub fn record(&self, gene: &str) -> Option<&GeneRecord> {
        self.records.iter().find(|r| r.gene == gene)
    }

    /// Category of any input gene; `None` only for excluded or unknown genes.
    /// Single lookup by scan, like [`ClassificationReport::record`].
    pub fn category_of(&self, gene: &str) -> Option<ExpressionCategory> {
        if let Some(r) = self.record(gene) {
            return Some(r.category);
        }
        self.null_genes
            .iter()
            .any(|g| g == gene)
            .then_some(ExpressionCategory::Null)
    }

    pub fn with_category(&self, category: ExpressionCategory) -> impl Iterator<Item = &GeneRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    pub fn category_counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts {
            null: self.null_genes.len(),
            excluded: self.excluded_genes.len(),
            ..Default::default()
        };
        for r in &self.records {
            match r.category {
                ExpressionCategory::Weak => counts.weak += 1,
                ExpressionCategory::Broad => counts.broad += 1,
                ExpressionCategory::Specific => counts.specific += 1,
                ExpressionCategory::Null => counts.null += 1,
            }
        }
        counts
    }

    /// `Specific` gene sets keyed by body part, for per-part enrichment.
    /// Every body part is present, possibly with an empty set.
    pub fn specific_genes_by_part(&self) -> BTreeMap<String, Vec<String>> {
        let mut by_part: BTreeMap<String, Vec<String>> = self
            .body_parts
            .iter()
            .map(|p| (p.clone(), Vec::new()))
            .collect();
        for r in self.with_category(ExpressionCategory::Specific) {
            for part in &r.specific_parts {
                by_part.entry(part.clone()).or_default().push(r.gene.clone());
            }
        }
        by_part
    }

    pub fn specific_part_counts(&self) -> BTreeMap<String, usize> {
        self.specific_genes_by_part()
            .into_iter()
            .map(|(part, genes)| (part, genes.len()))
            .collect()
    }

    pub fn summary(&self) -> ClassificationSummary {
        ClassificationSummary {
            counts: self.category_counts(),
            specific_per_part: self.specific_part_counts(),
        }
    }

    /// Hash index over records and `Null` genes, built in one pass.
    pub fn index(&self) -> GeneIndex<'_> {
        let mut entries = HashMap::with_capacity(self.records.len() + self.null_genes.len());
        for g in &self.null_genes {
            entries.insert(g.as_str(), None);
        }
        for r in &self.records {
            entries.insert(r.gene.as_str(), Some(r));
        }
        GeneIndex { entries }
    }
}

/// Borrowed gene lookup over a [`ClassificationReport`].
#[derive(Debug, Clone)]
pub struct GeneIndex<'a> {
    /// `None` marks a `Null` gene.
    entries: HashMap<&'a str, Option<&'a GeneRecord>>,
}

impl<'a> GeneIndex<'a> {
    pub fn record(&self, gene: &str) -> Option<&'a GeneRecord> {
        self.entries.get(gene).copied().flatten()
    }

    pub fn category_of(&self, gene: &str) -> Option<ExpressionCategory> {
        self.entries.get(gene).map(|entry| match entry {
            Some(r) => r.category,
            None => ExpressionCategory::Null,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
