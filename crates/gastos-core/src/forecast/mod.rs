//! Monthly expense forecasting
//!
//! Predicts next month's total expenses from the history of monthly
//! aggregates, and extrapolates further months with a trend multiplier.
//!
//! ## Pipeline
//!
//! 1. [`features::build_monthly_aggregates`] groups expenses by month and
//!    derives lag and rolling features
//! 2. Only *usable* rows (all features defined) are kept for training
//! 3. A least-squares model is fitted, or reused from the [`ModelCache`]
//!    when the usable rows have not changed
//! 4. The next month is predicted and widened into an interval
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gastos_core::forecast::Forecaster;
//!
//! let forecaster = Forecaster::new();
//! let next = forecaster.forecast_from_store(&db)?;
//! let quarter = forecaster.forecast_multiple_from_store(&db, 3)?;
//! ```

pub mod features;
pub mod regression;

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::ForecastConfig;
use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, ForecastResult, MonthlyAggregate};
use crate::store::TransactionStore;

pub use features::{build_monthly_aggregates, usable_rows, FEATURE_NAMES};
pub use regression::LinearModel;

/// How the current model was fitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDiagnostics {
    pub training_rows: usize,
    pub holdout_rows: usize,
    /// Mean absolute error on the hold-out rows (none without a hold-out)
    pub mae: Option<f64>,
    /// Root mean squared error on the hold-out rows
    pub rmse: Option<f64>,
}

struct CachedModel {
    fingerprint: String,
    model: LinearModel,
    diagnostics: ModelDiagnostics,
}

/// Holds the last fitted model, keyed on a fingerprint of its training rows
#[derive(Default)]
pub struct ModelCache {
    slot: Mutex<Option<CachedModel>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, fingerprint: &str) -> Option<(LinearModel, ModelDiagnostics)> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|c| c.fingerprint == fingerprint)
            .map(|c| (c.model.clone(), c.diagnostics.clone()))
    }

    fn put(&self, fingerprint: String, model: LinearModel, diagnostics: ModelDiagnostics) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CachedModel {
            fingerprint,
            model,
            diagnostics,
        });
    }

    /// Diagnostics of the cached model, if any
    pub fn diagnostics(&self) -> Option<ModelDiagnostics> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().map(|c| c.diagnostics.clone())
    }

    /// Drop the cached model so the next forecast refits
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// SHA-256 over the periods and feature values of the training rows
pub fn fingerprint(rows: &[MonthlyAggregate]) -> String {
    let mut hasher = Sha256::new();
    for row in rows {
        hasher.update(row.period.year.to_le_bytes());
        hasher.update(row.period.month.to_le_bytes());
        hasher.update(row.total_expense.to_bits().to_le_bytes());
        if let Some(features) = features::feature_vector(row) {
            for value in features {
                hasher.update(value.to_bits().to_le_bytes());
            }
        }
    }
    hex::encode(hasher.finalize())
}

/// Expense forecaster with an owned model cache
pub struct Forecaster {
    config: ForecastConfig,
    cache: ModelCache,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster {
    pub fn new() -> Self {
        Self::with_config(ForecastConfig::default())
    }

    pub fn with_config(config: ForecastConfig) -> Self {
        Self {
            config,
            cache: ModelCache::new(),
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Diagnostics of the most recently fitted model
    pub fn diagnostics(&self) -> Option<ModelDiagnostics> {
        self.cache.diagnostics()
    }

    /// Force the next forecast to refit
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Forecast next month from the store's expense snapshot
    pub fn forecast_from_store<S: TransactionStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<ForecastResult> {
        self.forecast(&store.list_expenses()?)
    }

    /// Forecast `months` months from the store's expense snapshot
    pub fn forecast_multiple_from_store<S: TransactionStore + ?Sized>(
        &self,
        store: &S,
        months: usize,
    ) -> Result<Vec<ForecastResult>> {
        self.forecast_multiple(&store.list_expenses()?, months)
    }

    /// Forecast the month after the latest usable month
    pub fn forecast(&self, expenses: &[ExpenseRecord]) -> Result<ForecastResult> {
        let usable = self.training_rows(expenses)?;
        let model = self.model_for(&usable);
        Ok(self.next_month(&usable, &model))
    }

    /// Forecast several consecutive months.
    ///
    /// The first month comes from the model; later months compound the
    /// recent average month-over-month change onto the previous estimate,
    /// with a wider interval and confidence that never increases.
    pub fn forecast_multiple(
        &self,
        expenses: &[ExpenseRecord],
        months: usize,
    ) -> Result<Vec<ForecastResult>> {
        if months == 0 {
            return Ok(Vec::new());
        }

        let usable = self.training_rows(expenses)?;
        let model = self.model_for(&usable);
        let first = self.next_month(&usable, &model);
        let trend = self.trend(&usable);
        debug!(trend, "Multi-month trend");

        let mut results = Vec::with_capacity(months);
        results.push(first);

        for step in 1..months {
            let prev = &results[step - 1];
            let estimate = (prev.estimate * (1.0 + trend)).max(0.0);
            let margin = estimate * self.config.extended_margin;
            let cap = self.config.step_confidence(step);

            let next = ForecastResult {
                estimate,
                lower_bound: (estimate - margin).max(0.0),
                upper_bound: estimate + margin,
                target_period: prev.target_period.next(),
                confidence: prev.confidence.min(cap),
            };
            results.push(next);
        }

        Ok(results)
    }

    /// Usable monthly rows, or InsufficientData when there are too few
    fn training_rows(&self, expenses: &[ExpenseRecord]) -> Result<Vec<MonthlyAggregate>> {
        let usable = usable_rows(&build_monthly_aggregates(expenses));
        let required = self.config.min_usable_rows.max(1);
        if usable.len() < required {
            return Err(Error::InsufficientData {
                required,
                available: usable.len(),
            });
        }
        Ok(usable)
    }

    /// Cached model for these rows, fitting one on a miss
    fn model_for(&self, usable: &[MonthlyAggregate]) -> LinearModel {
        let key = fingerprint(usable);
        if let Some((model, _)) = self.cache.get(&key) {
            debug!(fingerprint = %&key[..12], "Forecast model cache hit");
            return model;
        }

        let (model, diagnostics) = self.fit(usable);
        info!(
            training_rows = diagnostics.training_rows,
            holdout_rows = diagnostics.holdout_rows,
            mae = ?diagnostics.mae,
            rmse = ?diagnostics.rmse,
            "Fitted forecast model"
        );
        self.cache.put(key, model.clone(), diagnostics);
        model
    }

    /// Fit on the rows, holding out the most recent ones when there are enough
    fn fit(&self, usable: &[MonthlyAggregate]) -> (LinearModel, ModelDiagnostics) {
        let x: Vec<Vec<f64>> = usable
            .iter()
            .filter_map(features::feature_vector)
            .map(|f| f.to_vec())
            .collect();
        let y: Vec<f64> = usable.iter().map(|r| r.total_expense).collect();
        let n = x.len();

        let holdout = if n > self.config.holdout_min_rows && n > 1 {
            let rows = (n as f64 * self.config.holdout_fraction).ceil() as usize;
            rows.clamp(1, n - 1)
        } else {
            0
        };
        let split = n - holdout;

        let model = LinearModel::fit(&x[..split], &y[..split]).unwrap_or_else(|| LinearModel {
            intercept: y.iter().sum::<f64>() / n.max(1) as f64,
            coefficients: vec![0.0; FEATURE_NAMES.len()],
        });

        let (mae, rmse) = if holdout > 0 {
            let predicted: Vec<f64> = x[split..].iter().map(|row| model.predict(row)).collect();
            let (mae, rmse) = regression::error_metrics(&predicted, &y[split..]);
            (Some(mae), Some(rmse))
        } else {
            (None, None)
        };

        let diagnostics = ModelDiagnostics {
            training_rows: split,
            holdout_rows: holdout,
            mae,
            rmse,
        };
        (model, diagnostics)
    }

    /// One-step forecast from the latest usable rows
    fn next_month(&self, usable: &[MonthlyAggregate], model: &LinearModel) -> ForecastResult {
        let n = usable.len();
        let last = &usable[n - 1];
        let recent = &usable[n.saturating_sub(3)..];
        let recent_len = recent.len() as f64;

        let mean_count =
            recent.iter().map(|r| f64::from(r.transaction_count)).sum::<f64>() / recent_len;
        let mean_avg = recent.iter().map(|r| r.avg_per_transaction).sum::<f64>() / recent_len;
        let back = |k: usize| {
            n.checked_sub(k + 1)
                .map(|i| usable[i].total_expense)
                .unwrap_or(last.total_expense)
        };

        let target_period = last.period.next();
        let row = [
            f64::from(target_period.month),
            mean_count,
            mean_avg,
            last.total_expense,
            back(1),
            back(2),
            last.rolling3_avg.unwrap_or(last.total_expense),
        ];

        let predicted = model.predict(&row);
        let predicted = if predicted.is_finite() {
            predicted
        } else {
            last.total_expense
        };

        let estimate = predicted.max(0.0);
        let margin = estimate * self.config.next_month_margin;

        ForecastResult {
            estimate,
            lower_bound: (estimate - margin).max(0.0),
            upper_bound: estimate + margin,
            target_period,
            confidence: self.config.history_confidence(n),
        }
    }

    /// Mean month-over-month change over the trailing window (0 when too short)
    fn trend(&self, usable: &[MonthlyAggregate]) -> f64 {
        if usable.len() < self.config.trend_min_points {
            return 0.0;
        }

        let window = &usable[usable.len().saturating_sub(self.config.trend_window)..];
        let changes: Vec<f64> = window
            .windows(2)
            .filter(|pair| pair[0].total_expense > 0.0)
            .map(|pair| (pair[1].total_expense - pair[0].total_expense) / pair[0].total_expense)
            .collect();

        if changes.is_empty() {
            0.0
        } else {
            changes.iter().sum::<f64>() / changes.len() as f64
        }
    }
}

#[cfg(test)]
mod tests;
