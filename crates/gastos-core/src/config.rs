//! Engine configuration
//!
//! All classification, training and forecasting tunables live here.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a layered resolution:
//! 1. An explicit path, which must exist
//! 2. Override in data dir (~/.local/share/gastos/config/engine.toml), if present
//! 3. Embedded defaults (compiled into binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../config/engine.toml");

/// Classification and suggestion tunables
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub keyword_similarity_threshold: f64,
    pub history_similarity_threshold: f64,
    pub history_frequency_weight: f64,
    pub table_keyword_weight: f64,
    pub confidence_divisor: f64,
    pub suggestion_limit: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keyword_similarity_threshold: 0.6,
            history_similarity_threshold: 0.7,
            history_frequency_weight: 0.1,
            table_keyword_weight: 1.5,
            confidence_divisor: 20.0,
            suggestion_limit: 3,
        }
    }
}

/// Keyword learning tunables
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub max_keywords: usize,
    pub min_token_len: usize,
    pub min_keyword_len: usize,
    pub stop_words: Vec<String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_keywords: 50,
            min_token_len: 2,
            min_keyword_len: 3,
            stop_words: [
                "de", "da", "do", "das", "dos", "em", "na", "no", "para", "com", "por", "a", "o",
                "e",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Forecasting tunables
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub min_usable_rows: usize,
    pub holdout_min_rows: usize,
    pub holdout_fraction: f64,
    pub next_month_margin: f64,
    pub extended_margin: f64,
    pub trend_window: usize,
    pub trend_min_points: usize,
    pub confidence_steps: Vec<ConfidenceStep>,
    pub base_confidence: f64,
    pub step_confidence_start: f64,
    pub step_confidence_decay: f64,
    pub step_confidence_floor: f64,
}

/// Next-month confidence granted once `min_rows` usable months are available
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfidenceStep {
    pub min_rows: usize,
    pub confidence: f64,
}

impl ForecastConfig {
    /// Confidence of a next-month forecast backed by `usable` months
    pub fn history_confidence(&self, usable: usize) -> f64 {
        self.confidence_steps
            .iter()
            .filter(|s| usable >= s.min_rows)
            .max_by_key(|s| s.min_rows)
            .map_or(self.base_confidence, |s| s.confidence)
    }

    /// Confidence cap for the forecast `step` months after the first
    pub fn step_confidence(&self, step: usize) -> f64 {
        (self.step_confidence_start - self.step_confidence_decay * step as f64)
            .max(self.step_confidence_floor)
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_usable_rows: 4,
            holdout_min_rows: 6,
            holdout_fraction: 0.2,
            next_month_margin: 0.15,
            extended_margin: 0.20,
            trend_window: 6,
            trend_min_points: 3,
            confidence_steps: vec![
                ConfidenceStep { min_rows: 12, confidence: 0.9 },
                ConfidenceStep { min_rows: 6, confidence: 0.7 },
                ConfidenceStep { min_rows: 3, confidence: 0.5 },
            ],
            base_confidence: 0.3,
            step_confidence_start: 0.8,
            step_confidence_decay: 0.15,
            step_confidence_floor: 0.3,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub classifier: ClassifierConfig,
    pub training: TrainingConfig,
    pub forecast: ForecastConfig,
}

impl EngineConfig {
    /// Load configuration (explicit path first, then default override location, then embedded)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        if let Some(p) = override_path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            return Self::from_file(p);
        }

        match default_config_path() {
            Some(p) if p.exists() => Self::from_file(&p),
            _ => Self::embedded(),
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "Loaded engine config");
        Self::from_toml_str(&content)
    }

    /// The embedded defaults
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(DEFAULT_CONFIG)
    }

    /// Parse config from TOML content, overlaying onto defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = EngineConfig::default();

        if let Some(c) = raw.classifier {
            let target = &mut config.classifier;
            overlay(&mut target.keyword_similarity_threshold, c.keyword_similarity_threshold);
            overlay(&mut target.history_similarity_threshold, c.history_similarity_threshold);
            overlay(&mut target.history_frequency_weight, c.history_frequency_weight);
            overlay(&mut target.table_keyword_weight, c.table_keyword_weight);
            overlay(&mut target.confidence_divisor, c.confidence_divisor);
            overlay(&mut target.suggestion_limit, c.suggestion_limit);
        }

        if let Some(t) = raw.training {
            let target = &mut config.training;
            overlay(&mut target.max_keywords, t.max_keywords);
            overlay(&mut target.min_token_len, t.min_token_len);
            overlay(&mut target.min_keyword_len, t.min_keyword_len);
            if let Some(words) = t.stop_words {
                target.stop_words = words.into_iter().map(|w| w.to_lowercase()).collect();
            }
        }

        if let Some(f) = raw.forecast {
            let target = &mut config.forecast;
            overlay(&mut target.min_usable_rows, f.min_usable_rows);
            overlay(&mut target.holdout_min_rows, f.holdout_min_rows);
            overlay(&mut target.holdout_fraction, f.holdout_fraction);
            overlay(&mut target.next_month_margin, f.next_month_margin);
            overlay(&mut target.extended_margin, f.extended_margin);
            overlay(&mut target.trend_window, f.trend_window);
            overlay(&mut target.trend_min_points, f.trend_min_points);
            overlay(&mut target.confidence_steps, f.confidence_steps);
            overlay(&mut target.base_confidence, f.base_confidence);
            overlay(&mut target.step_confidence_start, f.step_confidence_start);
            overlay(&mut target.step_confidence_decay, f.step_confidence_decay);
            overlay(&mut target.step_confidence_floor, f.step_confidence_floor);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let c = &self.classifier;
        let f = &self.forecast;
        let fractions = [
            ("keyword_similarity_threshold", c.keyword_similarity_threshold),
            ("history_similarity_threshold", c.history_similarity_threshold),
            ("holdout_fraction", f.holdout_fraction),
            ("base_confidence", f.base_confidence),
            ("step_confidence_start", f.step_confidence_start),
            ("step_confidence_floor", f.step_confidence_floor),
        ];
        let steps = f
            .confidence_steps
            .iter()
            .map(|s| ("confidence_steps.confidence", s.confidence));
        for (name, value) in fractions.into_iter().chain(steps) {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!("{} must be in [0, 1], got {}", name, value)));
            }
        }
        for (name, value) in [
            ("next_month_margin", f.next_month_margin),
            ("extended_margin", f.extended_margin),
            ("step_confidence_decay", f.step_confidence_decay),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if c.confidence_divisor <= 0.0 {
            return Err(Error::Config("confidence_divisor must be positive".into()));
        }
        if self.training.max_keywords == 0 {
            return Err(Error::Config("max_keywords must be at least 1".into()));
        }
        // The regression has seven inputs; fewer rows than that still fits,
        // but a single row cannot.
        if self.forecast.min_usable_rows < 2 {
            return Err(Error::Config("min_usable_rows must be at least 2".into()));
        }
        Ok(())
    }
}

fn overlay<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("gastos").join("config").join("engine.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    classifier: Option<RawClassifier>,
    training: Option<RawTraining>,
    forecast: Option<RawForecast>,
}

#[derive(Debug, Deserialize)]
struct RawClassifier {
    keyword_similarity_threshold: Option<f64>,
    history_similarity_threshold: Option<f64>,
    history_frequency_weight: Option<f64>,
    table_keyword_weight: Option<f64>,
    confidence_divisor: Option<f64>,
    suggestion_limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawTraining {
    max_keywords: Option<usize>,
    min_token_len: Option<usize>,
    min_keyword_len: Option<usize>,
    stop_words: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    min_usable_rows: Option<usize>,
    holdout_min_rows: Option<usize>,
    holdout_fraction: Option<f64>,
    next_month_margin: Option<f64>,
    extended_margin: Option<f64>,
    trend_window: Option<usize>,
    trend_min_points: Option<usize>,
    confidence_steps: Option<Vec<ConfidenceStep>>,
    base_confidence: Option<f64>,
    step_confidence_start: Option<f64>,
    step_confidence_decay: Option<f64>,
    step_confidence_floor: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = EngineConfig::embedded().unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [training]
            max_keywords = 10

            [forecast]
            next_month_margin = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.training.max_keywords, 10);
        assert_eq!(config.forecast.next_month_margin, 0.25);
        // Untouched sections keep their defaults
        assert_eq!(config.classifier, ClassifierConfig::default());
        assert_eq!(config.training.stop_words.len(), 14);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [classifier]
            keyword_similarity_threshold = 1.5
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = EngineConfig::from_toml_str("[classifier");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "[classifier]\nsuggestion_limit = 5\n").unwrap();

        let config = EngineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.classifier.suggestion_limit, 5);
    }

    #[test]
    fn test_load_missing_explicit_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        let err = EngineConfig::load(Some(&path)).unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.starts_with("Config file not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_or_nan_margin_rejected() {
        for toml in [
            "[forecast]\nnext_month_margin = -0.1\n",
            "[forecast]\nextended_margin = -1.0\n",
            "[forecast]\nnext_month_margin = nan\n",
            "[forecast]\nextended_margin = inf\n",
        ] {
            let result = EngineConfig::from_toml_str(toml);
            assert!(matches!(result, Err(Error::Config(_))), "accepted {toml:?}");
        }
    }

    #[test]
    fn test_confidence_steps_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [forecast]
            base_confidence = 0.1
            step_confidence_start = 0.6
            step_confidence_decay = 0.2
            step_confidence_floor = 0.25

            [[forecast.confidence_steps]]
            min_rows = 4
            confidence = 0.4

            [[forecast.confidence_steps]]
            min_rows = 24
            confidence = 0.95
            "#,
        )
        .unwrap();
        let forecast = &config.forecast;

        assert_eq!(forecast.history_confidence(3), 0.1);
        assert_eq!(forecast.history_confidence(12), 0.4);
        assert_eq!(forecast.history_confidence(30), 0.95);
        assert!((forecast.step_confidence(1) - 0.4).abs() < 1e-9);
        assert_eq!(forecast.step_confidence(5), 0.25);
    }

    #[test]
    fn test_out_of_range_confidence_step_rejected() {
        let result = EngineConfig::from_toml_str(
            "[[forecast.confidence_steps]]\nmin_rows = 3\nconfidence = 1.2\n",
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
