//! tissuex-classifier — Tissue-specificity classification of genes.
//!
//! Scores each gene of a gene × body-part median expression matrix with the
//! tau specificity index and assigns it to `Null`, `Weak`, `Broad` or
//! `Specific`, attributing specific genes to the body parts where they are
//! stably expressed.

pub mod matrix;
pub mod specificity;
pub mod classify;
pub mod aggregate;
pub mod source;
pub mod table;

pub use tissuex_common::classifier_config::{
    EXPRESSED_THRESHOLD, SPECIFICITY_THRESHOLD, STABLE_THRESHOLD,
};
pub use tissuex_common::{ThresholdConfig, TissuexError};

pub use aggregate::{aggregate_medians, SampleAbundance, SampleAnnotation};
pub use classify::{
    classify, ClassificationReport, ExpressionCategory, ExpressionClassifier, GeneIndex,
    GeneRecord,
};
pub use matrix::{ExpressionMatrix, ExpressionMatrixBuilder};
