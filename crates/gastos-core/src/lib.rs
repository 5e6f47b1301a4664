//! Gastos Core Library
//!
//! Shared functionality for the Gastos personal expense tracker:
//! - Database access and migrations
//! - Category classification engine (keyword, fuzzy and history matching)
//! - Category suggestions and keyword training
//! - Monthly expense forecasting
//! - Classification statistics and spending patterns
//! - CSV import and export

pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod forecast;
pub mod import;
pub mod ledger;
pub mod models;
pub mod store;

/// Test utilities including an in-memory transaction store
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use classifier::{Classification, Classifier, MatchStage, TrainingResult};
pub use config::{
    ClassifierConfig, ConfidenceStep, EngineConfig, ForecastConfig, TrainingConfig,
};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{Forecaster, ModelDiagnostics};
pub use import::{import_csv, parse_csv, ImportResult};
pub use ledger::{add_transaction, AddedTransaction};
pub use models::*;
pub use store::TransactionStore;
