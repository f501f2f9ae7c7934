//! tissuex-common — Shared error type and run configuration used across all tissuex crates.

pub mod error;
pub mod classifier_config;

// Re-export commonly used types
pub use classifier_config::{ClassifierConfig, OutputConfig, SampleFilterConfig, ThresholdConfig};
pub use error::{Result, TissuexError};
