// ⚠️ Error types shared by the extractor, loaders and configuration layer

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioError {
    /// A data row showed up before any header row declared the column roles
    #[error("table '{category}': data row {row} appears before any header row")]
    MissingHeader { category: String, row: usize },

    #[error("line {line}: '{tag}' row appears before any caption row")]
    RowBeforeCaption { line: usize, tag: String },

    #[error("line {line}: unknown row tag '{tag}' (expected caption, th or td)")]
    UnknownRowTag { line: usize, tag: String },

    #[error("unsupported input file: {0:?} (expected .json or .csv)")]
    UnsupportedInput(PathBuf),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
