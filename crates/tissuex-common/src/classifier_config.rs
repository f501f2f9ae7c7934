//! Run configuration for expression classification.
//!
//! The policy thresholds are fixed constants of the classification rule; a
//! configuration file (YAML, JSON or TOML) can override them for
//! sensitivity analysis and tests. Every section falls back to its defaults
//! when omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TissuexError};

/// A body part counts as expressed when its value is strictly above this.
pub const EXPRESSED_THRESHOLD: f64 = 1.0;

/// A body part counts as stably expressed when its value is strictly above this.
pub const STABLE_THRESHOLD: f64 = 5.0;

/// Genes at or above this specificity index are `Specific`, below it `Broad`.
pub const SPECIFICITY_THRESHOLD: f64 = 0.85;

/// Minimum fraction of mapped reads for a sample to be retained.
pub const MIN_MAPPING_RATE: f64 = 0.5;

/// Minimum number of processed reads for a sample to be retained.
pub const MIN_READS: u64 = 1_000_000;

/// Complete classification run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Categorization thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Sample retention before median aggregation
    #[serde(default)]
    pub sample_filter: SampleFilterConfig,

    /// Output options
    #[serde(default)]
    pub output: OutputConfig,

    /// Execution options
    #[serde(default)]
    pub execution: ExecutionConfig,
}

// ── Thresholds ────────────────────────────────────────────────────────────────

/// Policy table for the categorization rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Detection threshold (original units, e.g. TPM)
    #[serde(default = "default_expressed")]
    pub expressed: f64,

    /// Stable expression threshold (original units)
    #[serde(default = "default_stable")]
    pub stable: f64,

    /// Specificity index cut-off between `Broad` and `Specific`
    #[serde(default = "default_specificity")]
    pub specificity: f64,
}

fn default_expressed() -> f64 { EXPRESSED_THRESHOLD }
fn default_stable() -> f64 { STABLE_THRESHOLD }
fn default_specificity() -> f64 { SPECIFICITY_THRESHOLD }

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            expressed: default_expressed(),
            stable: default_stable(),
            specificity: default_specificity(),
        }
    }
}

impl ThresholdConfig {
    pub fn is_expressed(&self, value: f64) -> bool {
        value > self.expressed
    }

    pub fn is_stable(&self, value: f64) -> bool {
        value > self.stable
    }

    /// Reject threshold tables the categorization rule cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !self.expressed.is_finite() || self.expressed < 0.0 {
            return Err(TissuexError::Config(format!(
                "expressed threshold must be a non-negative number, got {}",
                self.expressed
            )));
        }
        if !self.stable.is_finite() || self.stable < self.expressed {
            return Err(TissuexError::Config(format!(
                "stable threshold ({}) must be at least the expressed threshold ({})",
                self.stable, self.expressed
            )));
        }
        if !(0.0..=1.0).contains(&self.specificity) {
            return Err(TissuexError::Config(format!(
                "specificity threshold must lie in [0, 1], got {}",
                self.specificity
            )));
        }
        Ok(())
    }
}

// ── Sample filter ─────────────────────────────────────────────────────────────

/// Quality gate applied to sequencing runs before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleFilterConfig {
    /// Fraction of reads mapped by the quantifier (0.0 - 1.0)
    #[serde(default = "default_min_mapping_rate")]
    pub min_mapping_rate: f64,

    /// Reads remaining after trimming
    #[serde(default = "default_min_reads")]
    pub min_reads: u64,
}

fn default_min_mapping_rate() -> f64 { MIN_MAPPING_RATE }
fn default_min_reads() -> u64 { MIN_READS }

impl Default for SampleFilterConfig {
    fn default() -> Self {
        Self {
            min_mapping_rate: default_min_mapping_rate(),
            min_reads: default_min_reads(),
        }
    }
}

impl SampleFilterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_mapping_rate) {
            return Err(TissuexError::Config(format!(
                "min_mapping_rate must lie in [0, 1], got {}",
                self.min_mapping_rate
            )));
        }
        Ok(())
    }
}

// ── Output Configuration ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (tsv, json)
    #[serde(default = "default_format")]
    pub format: String,

    /// Decimal places for scores in TSV output
    #[serde(default = "default_precision")]
    pub score_precision: usize,
}

fn default_format() -> String { "tsv".to_string() }
fn default_precision() -> usize { 6 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            score_precision: default_precision(),
        }
    }
}

// ── Execution Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Score genes on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Worker threads (None = rayon default)
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_true() -> bool { true }

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: default_true(),
            threads: None,
        }
    }
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl ClassifierConfig {
    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load by file extension (`.yaml`/`.yml`, `.json`, anything else as TOML).
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(path)?,
            Some("json") => Self::from_json(path)?,
            _ => Self::from_toml(path)?,
        };
        config.validate()?;
        tracing::debug!(?path, "loaded classifier configuration");
        Ok(config)
    }

    /// Save to YAML file
    pub fn to_yaml(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.sample_filter.validate()?;
        match self.output.format.as_str() {
            "tsv" | "json" => Ok(()),
            other => Err(TissuexError::Config(format!(
                "unsupported output format '{other}' (expected tsv or json)"
            ))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClassifierConfig::default();
        assert_eq!(config.thresholds.expressed, 1.0);
        assert_eq!(config.thresholds.stable, 5.0);
        assert_eq!(config.thresholds.specificity, 0.85);
        assert!(config.execution.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_predicates_are_strict() {
        let t = ThresholdConfig::default();
        assert!(!t.is_expressed(1.0));
        assert!(t.is_expressed(1.0001));
        assert!(!t.is_stable(5.0));
        assert!(t.is_stable(5.5));
    }

    #[test]
    fn test_thresholds_out_of_order_rejected() {
        let t = ThresholdConfig { expressed: 10.0, stable: 5.0, specificity: 0.85 };
        assert!(matches!(t.validate(), Err(TissuexError::Config(_))));

        let t = ThresholdConfig { specificity: 1.5, ..Default::default() };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: ClassifierConfig = toml::from_str(
            r#"
            [thresholds]
            specificity = 0.9

            [execution]
            parallel = false
            "#,
        )
        .unwrap();
        assert_eq!(config.thresholds.specificity, 0.9);
        assert_eq!(config.thresholds.stable, STABLE_THRESHOLD);
        assert_eq!(config.sample_filter.min_reads, MIN_READS);
        assert!(!config.execution.parallel);
        assert_eq!(config.output.format, "tsv");
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut config = ClassifierConfig::default();
        config.output.format = "xlsx".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tissuex.yaml");
        let mut config = ClassifierConfig::default();
        config.thresholds.stable = 10.0;
        config.to_yaml(&path).unwrap();

        let parsed = ClassifierConfig::from_path(&path).unwrap();
        assert_eq!(parsed, config);
    }
}
