//! Error types for the ETL pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, cleaning or saving a table
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Failed to read input file {}", .path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Missing expected column: {0}")]
    MissingColumn(String),

    #[error("Unparseable date value: {value:?}")]
    DateParse { value: String },

    #[error("Invalid numeric value {value:?} in column {column}")]
    InvalidNumber { column: String, value: String },

    #[error("Indicator column {0} collides with an existing column")]
    ColumnCollision(String),

    #[error("Cannot infer table shape from {}; pass --shape explicitly", .0.display())]
    UnknownShape(PathBuf),

    #[error("Failed to write to store: {0}")]
    StoreWrite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
