//! Error types for Gastos

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient data: need at least {required} usable months, have {available}")]
    InsufficientData { required: usize, available: usize },
}

impl Error {
    /// True when the error came from the transaction store rather than the engine
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Pool(_))
    }

    /// True when the caller should show a "need more history" message
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Error::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
