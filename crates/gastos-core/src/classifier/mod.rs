//! Category classification engine
//!
//! Assigns a category to a transaction from its free-text description by
//! running an ordered cascade of matchers; the first one that finds a
//! category wins.
//!
//! ## Cascade
//!
//! 1. **Exact keyword** - a learned category keyword appears verbatim
//! 2. **Fuzzy keyword** - the whole description is close to a learned keyword
//! 3. **Keyword table** - scored against the built-in vocabulary
//! 4. **History** - close to a description that was already categorized
//!
//! Blank descriptions are unclassified without consulting the store.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gastos_core::classifier::Classifier;
//!
//! let classifier = Classifier::new(&db);
//! let category_id = classifier.classify("Uber *Trip 4821")?;
//! let ranked = classifier.suggest("Compra no supermercado")?;
//! ```

pub mod keywords;
pub mod matchers;
pub mod normalize;
pub mod similarity;
mod suggest;
mod training;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::{Category, Suggestion};
use crate::store::TransactionStore;

pub use matchers::{
    ExactKeywordMatcher, FuzzyKeywordMatcher, HistoryMatcher, KeywordTableMatcher, Matcher,
};
pub use normalize::normalize;
pub use training::TrainingResult;

/// Which cascade stage produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    ExactKeyword,
    FuzzyKeyword,
    KeywordTable,
    History,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactKeyword => "exact_keyword",
            Self::FuzzyKeyword => "fuzzy_keyword",
            Self::KeywordTable => "keyword_table",
            Self::History => "history",
        }
    }
}

impl std::fmt::Display for MatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A category together with the stage that found it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category_id: i64,
    pub stage: MatchStage,
}

/// Everything a matcher may look at for one description
pub struct MatchContext<'a> {
    /// Normalized description (never empty)
    pub normalized: &'a str,
    /// Categories in store order
    pub categories: &'a [Category],
    /// Category name to id, built once per call
    pub ids_by_name: &'a HashMap<&'a str, i64>,
    /// Store for matchers that need more than the category snapshot
    pub store: &'a dyn TransactionStore,
}

/// Classification, suggestion and training over a transaction store
pub struct Classifier<'a, S: TransactionStore> {
    store: &'a S,
    config: EngineConfig,
    pipeline: Vec<Box<dyn Matcher>>,
}

impl<'a, S: TransactionStore> Classifier<'a, S> {
    /// Create a classifier with the default configuration
    pub fn new(store: &'a S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create a classifier with explicit tunables
    pub fn with_config(store: &'a S, config: EngineConfig) -> Self {
        let c = &config.classifier;
        let pipeline: Vec<Box<dyn Matcher>> = vec![
            Box::new(ExactKeywordMatcher),
            Box::new(FuzzyKeywordMatcher::new(c.keyword_similarity_threshold)),
            Box::new(KeywordTableMatcher),
            Box::new(HistoryMatcher::new(
                c.history_similarity_threshold,
                c.history_frequency_weight,
            )),
        ];

        Self {
            store,
            config,
            pipeline,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Classify a description, returning the category id or `None` when unclassified
    pub fn classify(&self, description: &str) -> Result<Option<i64>> {
        Ok(self
            .classify_detailed(description)?
            .map(|c| c.category_id))
    }

    /// Classify a description and report which stage matched
    pub fn classify_detailed(&self, description: &str) -> Result<Option<Classification>> {
        let normalized = normalize(description);
        if normalized.is_empty() {
            return Ok(None);
        }

        let categories = self.store.list_categories()?;
        let ids_by_name = ids_by_name(&categories);
        let ctx = MatchContext {
            normalized: &normalized,
            categories: &categories,
            ids_by_name: &ids_by_name,
            store: self.store,
        };

        for matcher in &self.pipeline {
            if let Some(category_id) = matcher.attempt(&ctx)? {
                debug!(
                    stage = %matcher.stage(),
                    category_id,
                    description = %normalized,
                    "Classified"
                );
                return Ok(Some(Classification {
                    category_id,
                    stage: matcher.stage(),
                }));
            }
        }

        debug!(description = %normalized, "No category matched");
        Ok(None)
    }

    /// Rank the categories that best fit a description
    pub fn suggest(&self, description: &str) -> Result<Vec<Suggestion>> {
        let normalized = normalize(description);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let categories = self.store.list_categories()?;
        Ok(suggest::rank(&normalized, &categories, &self.config.classifier))
    }

    /// Learn keywords for a category from a description
    pub fn train(&self, description: &str, category_id: i64) -> Result<TrainingResult> {
        training::train(self.store, &self.config.training, description, category_id)
    }
}

fn ids_by_name(categories: &[Category]) -> HashMap<&str, i64> {
    let mut ids = HashMap::with_capacity(categories.len());
    for category in categories {
        // First category with a given name keeps it
        ids.entry(category.name.as_str()).or_insert(category.id);
    }
    ids
}
