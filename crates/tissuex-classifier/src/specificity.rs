//! Tissue-specificity index (tau).
//!
//! For a log-space expression vector x over P ≥ 2 body parts:
//!
//! ```text
//! tau = Σ (1 − x_i / max(x)) / (P − 1)      (tau = 0 when max(x) = 0)
//! ```
//!
//! 0 means equal expression in every part, 1 means all expression sits in a
//! single part.

use tissuex_common::{Result, TissuexError};

/// log2(value + 1), the transform applied before scoring.
pub fn log_expression(value: f64) -> f64 {
    (value + 1.0).log2()
}

/// Tau over values that are already log-transformed.
pub fn tau(log_values: &[f64]) -> Result<f64> {
    if log_values.len() < 2 {
        return Err(TissuexError::invalid_input(format!(
            "specificity needs at least two body parts, got {}",
            log_values.len()
        )));
    }
    if let Some(v) = log_values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(TissuexError::invalid_input(format!(
            "specificity is undefined for value {v}"
        )));
    }
    Ok(tau_index(log_values))
}

/// Tau of a gene given its original (non-log) values.
pub fn specificity_score(values: &[f64]) -> Result<f64> {
    let logged: Vec<f64> = values.iter().copied().map(log_expression).collect();
    tau(&logged)
}

/// Unchecked core; callers guarantee `len >= 2` and finite non-negative input.
pub(crate) fn tau_index(x: &[f64]) -> f64 {
    let max = x.iter().copied().fold(0.0_f64, f64::max);
    if max == 0.0 {
        return 0.0;
    }
    let deviation: f64 = x.iter().map(|&xi| 1.0 - xi / max).sum();
    (deviation / (x.len() - 1) as f64).clamp(0.0, 1.0)
}
