//! Trait for per-gene body-part expression lookups.

use std::collections::{BTreeMap, BTreeSet};

use tissuex_common::Result;

use crate::matrix::ExpressionMatrix;

/// Anything that can report median expression per body part for a gene.
pub trait ExpressionSource: Send + Sync {
    /// Gene identifiers known to the source, in the order rows should appear.
    fn genes(&self) -> Vec<String>;

    /// Median expression of `gene` keyed by body part.
    fn median_expression(&self, gene: &str) -> Option<BTreeMap<String, f64>>;
}

/// Collect a source into a matrix. Body parts are the sorted union of all
/// parts reported; a part a gene lacks becomes a missing cell.
pub fn matrix_from_source(source: &dyn ExpressionSource) -> Result<ExpressionMatrix> {
    let genes = source.genes();
    let profiles: Vec<BTreeMap<String, f64>> = genes
        .iter()
        .map(|g| source.median_expression(g).unwrap_or_default())
        .collect();

    let body_parts: Vec<String> = profiles
        .iter()
        .flat_map(|p| p.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = profiles
        .iter()
        .map(|p| {
            body_parts
                .iter()
                .map(|part| p.get(part).copied().unwrap_or(f64::NAN))
                .collect()
        })
        .collect();

    ExpressionMatrix::new(genes, body_parts, rows)
}

// ── Mock Implementation for Testing ────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockExpressionSource {
    order: Vec<String>,
    data: BTreeMap<String, BTreeMap<String, f64>>,
}

impl MockExpressionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, gene: &str, body_part: &str, expression: f64) -> Self {
        if !self.data.contains_key(gene) {
            self.order.push(gene.to_string());
        }
        let entry = self.data.entry(gene.to_string()).or_default();
        entry.insert(body_part.to_string(), expression);
        self
    }
}

impl ExpressionSource for MockExpressionSource {
    fn genes(&self) -> Vec<String> {
        self.order.clone()
    }

    fn median_expression(&self, gene: &str) -> Option<BTreeMap<String, f64>> {
        self.data.get(gene).cloned()
    }
}
