use thiserror::Error;

#[derive(Debug, Error)]
pub enum TissuexError {
    /// Structurally invalid input: negative values, fewer than two body
    /// parts, duplicate identifiers, inconsistent sample annotations.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: u64,
        column: usize,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TissuexError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TissuexError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TissuexError>;
