//! Gene × body-part expression matrix.
//!
//! Values are kept in original units (e.g. median TPM). A matrix that
//! exists is structurally valid: unique gene and body-part identifiers, at
//! least two body parts, no negative values (`-inf` included). `NaN` and
//! `+inf` cells stand for missing measurements; the classifier excludes
//! such genes.

use std::collections::HashSet;

use tissuex_common::{Result, TissuexError};

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionMatrix {
    genes: Vec<String>,
    body_parts: Vec<String>,
    /// Row-major, `genes.len() * body_parts.len()` cells.
    values: Vec<f64>,
}

impl ExpressionMatrix {
    /// Build a matrix from one row per gene, each row ordered as `body_parts`.
    pub fn new(genes: Vec<String>, body_parts: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if body_parts.len() < 2 {
            return Err(TissuexError::invalid_input(format!(
                "at least two body parts are required, got {}",
                body_parts.len()
            )));
        }
        ensure_unique("body part", &body_parts)?;
        ensure_unique("gene", &genes)?;

        if rows.len() != genes.len() {
            return Err(TissuexError::invalid_input(format!(
                "{} genes but {} value rows",
                genes.len(),
                rows.len()
            )));
        }

        let mut values = Vec::with_capacity(genes.len() * body_parts.len());
        for (gene, row) in genes.iter().zip(rows) {
            if row.len() != body_parts.len() {
                return Err(TissuexError::invalid_input(format!(
                    "gene '{}' has {} values for {} body parts",
                    gene,
                    row.len(),
                    body_parts.len()
                )));
            }
            if let Some((j, v)) = row
                .iter()
                .enumerate()
                .find(|(_, v)| **v < 0.0)
            {
                return Err(TissuexError::invalid_input(format!(
                    "negative expression {} for gene '{}' in '{}'",
                    v, gene, body_parts[j]
                )));
            }
            values.extend(row);
        }

        Ok(Self { genes, body_parts, values })
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn body_parts(&self) -> &[String] {
        &self.body_parts
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_parts(&self) -> usize {
        self.body_parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Values of the `i`-th gene, ordered as `body_parts()`.
    pub fn row(&self, i: usize) -> &[f64] {
        let p = self.body_parts.len();
        &self.values[i * p..(i + 1) * p]
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.genes
            .iter()
            .map(String::as_str)
            .zip(self.values.chunks_exact(self.body_parts.len()))
    }

    pub fn get(&self, gene: &str, body_part: &str) -> Option<f64> {
        let i = self.genes.iter().position(|g| g == gene)?;
        let j = self.body_parts.iter().position(|p| p == body_part)?;
        Some(self.row(i)[j])
    }

    /// True when every cell of the `i`-th gene is a finite number.
    pub fn is_complete(&self, i: usize) -> bool {
        self.row(i).iter().all(|v| v.is_finite())
    }
}

fn ensure_unique(kind: &str, ids: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(TissuexError::invalid_input(format!("duplicate {kind} identifier '{id}'")));
        }
    }
    Ok(())
}

// ── Builder ─────────────────────────────────────────────────────────────────

/// Cell-by-cell construction. Genes and body parts keep first-seen order;
/// cells never supplied are missing (`NaN`).
#[derive(Debug, Default)]
pub struct ExpressionMatrixBuilder {
    genes: Vec<String>,
    body_parts: Vec<String>,
    cells: Vec<(usize, usize, f64)>,
}

impl ExpressionMatrixBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, gene: &str, body_part: &str, value: f64) -> Self {
        self.insert(gene, body_part, value);
        self
    }

    pub fn insert(&mut self, gene: &str, body_part: &str, value: f64) {
        let i = index_of(&mut self.genes, gene);
        let j = index_of(&mut self.body_parts, body_part);
        self.cells.push((i, j, value));
    }

    /// Fails on a cell supplied twice, in addition to the checks of
    /// [`ExpressionMatrix::new`].
    pub fn build(self) -> Result<ExpressionMatrix> {
        let p = self.body_parts.len();
        let mut rows = vec![vec![f64::NAN; p]; self.genes.len()];
        let mut filled = vec![vec![false; p]; self.genes.len()];
        for (i, j, value) in self.cells {
            if std::mem::replace(&mut filled[i][j], true) {
                return Err(TissuexError::invalid_input(format!(
                    "duplicate value for gene '{}' in '{}'",
                    self.genes[i], self.body_parts[j]
                )));
            }
            rows[i][j] = value;
        }
        ExpressionMatrix::new(self.genes, self.body_parts, rows)
    }
}

fn index_of(ids: &mut Vec<String>, id: &str) -> usize {
    match ids.iter().position(|x| x == id) {
        Some(i) => i,
        None => {
            ids.push(id.to_string());
            ids.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rows_follow_input_order() {
        let m = ExpressionMatrix::new(
            names(&["A", "B"]),
            names(&["Leaf", "Root"]),
            vec![vec![0.2, 0.1], vec![10.0, 1.0]],
        )
        .unwrap();
        assert_eq!(m.n_genes(), 2);
        assert_eq!(m.row(1), &[10.0, 1.0]);
        assert_eq!(m.get("B", "Root"), Some(1.0));
        assert_eq!(m.get("C", "Root"), None);
        let genes: Vec<&str> = m.rows().map(|(g, _)| g).collect();
        assert_eq!(genes, vec!["A", "B"]);
    }

    #[test]
    fn test_single_body_part_rejected() {
        let err = ExpressionMatrix::new(names(&["A"]), names(&["Leaf"]), vec![vec![3.0]]).unwrap_err();
        assert!(matches!(err, TissuexError::InvalidInput(_)));
    }

    #[test]
    fn test_duplicate_identifiers_rejected() {
        let dup_gene = ExpressionMatrix::new(
            names(&["A", "A"]),
            names(&["Leaf", "Root"]),
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        );
        assert!(matches!(dup_gene, Err(TissuexError::InvalidInput(_))));

        let dup_part = ExpressionMatrix::new(
            names(&["A"]),
            names(&["Leaf", "Leaf"]),
            vec![vec![1.0, 2.0]],
        );
        assert!(matches!(dup_part, Err(TissuexError::InvalidInput(_))));
    }

    #[test]
    fn test_negative_value_rejected() {
        let err = ExpressionMatrix::new(
            names(&["A"]),
            names(&["Leaf", "Root"]),
            vec![vec![1.0, -0.5]],
        )
        .unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_negative_infinity_rejected() {
        let err = ExpressionMatrix::new(
            names(&["A"]),
            names(&["Leaf", "Root"]),
            vec![vec![f64::NEG_INFINITY, 3.0]],
        );
        assert!(matches!(err, Err(TissuexError::InvalidInput(_))));

        let m = ExpressionMatrix::new(
            names(&["A", "B"]),
            names(&["Leaf", "Root"]),
            vec![vec![f64::INFINITY, 3.0], vec![f64::NAN, 3.0]],
        )
        .unwrap();
        assert!(!m.is_complete(0));
        assert!(!m.is_complete(1));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = ExpressionMatrix::new(
            names(&["A"]),
            names(&["Leaf", "Root", "Seed"]),
            vec![vec![1.0, 2.0]],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_missing_values_are_allowed_but_incomplete() {
        let m = ExpressionMatrix::new(
            names(&["A", "B"]),
            names(&["Leaf", "Root"]),
            vec![vec![f64::NAN, 2.0], vec![1.0, 2.0]],
        )
        .unwrap();
        assert!(!m.is_complete(0));
        assert!(m.is_complete(1));
    }

    #[test]
    fn test_builder_fills_missing_cells() {
        let m = ExpressionMatrixBuilder::new()
            .with("A", "Leaf", 4.0)
            .with("B", "Root", 2.0)
            .with("A", "Root", 1.0)
            .build()
            .unwrap();
        assert_eq!(m.genes(), &["A".to_string(), "B".to_string()]);
        assert_eq!(m.body_parts(), &["Leaf".to_string(), "Root".to_string()]);
        assert_eq!(m.row(0), &[4.0, 1.0]);
        assert!(m.get("B", "Leaf").unwrap().is_nan());
    }

    #[test]
    fn test_builder_duplicate_cell_rejected() {
        let err = ExpressionMatrixBuilder::new()
            .with("A", "Leaf", 4.0)
            .with("A", "Root", 1.0)
            .with("A", "Leaf", 5.0)
            .build();
        assert!(matches!(err, Err(TissuexError::InvalidInput(_))));
    }
}
