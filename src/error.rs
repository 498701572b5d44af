use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::validate::ValidationReport;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Required table '{table}' not found in {}", .source_path.display())]
    MissingTable { table: String, source_path: PathBuf },

    #[error("Unsupported source: {}", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("Sheet '{sheet}' is malformed: {reason}")]
    InvalidSheet { sheet: String, reason: String },

    #[error("Malformed numeric value {value:?} in {table} row {row}, column '{column}'")]
    InvalidNumber {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("Validation failed with {} error(s)", .0.errors.len())]
    Validation(ValidationReport),
}

pub type Result<T> = std::result::Result<T, BuildError>;
