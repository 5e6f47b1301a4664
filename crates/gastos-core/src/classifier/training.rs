//! Keyword learning from manually categorized descriptions

use serde::Serialize;
use tracing::info;

use super::normalize::normalize;
use crate::config::TrainingConfig;
use crate::error::{Error, Result};
use crate::store::TransactionStore;

/// Outcome of a successful training call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingResult {
    pub category_id: i64,
    /// Keywords appended by this call, in order
    pub added: Vec<String>,
    /// Oldest keywords dropped to stay under the cap
    pub evicted: Vec<String>,
    /// Keyword count after training
    pub total_keywords: usize,
}

/// Tokens worth considering: longer than `min_token_len` and not stop words
fn relevant_tokens(normalized: &str, config: &TrainingConfig) -> Vec<String> {
    normalized
        .split_whitespace()
        .filter(|t| t.chars().count() > config.min_token_len)
        .filter(|t| !config.stop_words.iter().any(|s| s == t))
        .map(str::to_string)
        .collect()
}

pub(crate) fn train<S: TransactionStore + ?Sized>(
    store: &S,
    config: &TrainingConfig,
    description: &str,
    category_id: i64,
) -> Result<TrainingResult> {
    let normalized = normalize(description);
    if normalized.is_empty() {
        return Err(Error::InvalidInput("Description cannot be empty".into()));
    }

    let tokens = relevant_tokens(&normalized, config);
    if tokens.is_empty() {
        return Err(Error::InvalidInput(format!(
            "No usable keywords in '{}'",
            description.trim()
        )));
    }

    let category = store
        .list_categories()?
        .into_iter()
        .find(|c| c.id == category_id)
        .ok_or_else(|| Error::InvalidInput(format!("Unknown category id {}", category_id)))?;

    let mut keywords = category.keywords;
    let mut added = Vec::new();
    for token in tokens {
        if token.chars().count() > config.min_keyword_len && !keywords.contains(&token) {
            keywords.push(token.clone());
            added.push(token);
        }
    }

    // FIFO cap: the oldest keywords go first
    let overflow = keywords.len().saturating_sub(config.max_keywords);
    let evicted: Vec<String> = keywords.drain(..overflow).collect();

    if !added.is_empty() || !evicted.is_empty() {
        let updated = store.update_category_keywords(category_id, &keywords)?;
        if !updated {
            return Err(Error::NotFound(format!("Category {}", category_id)));
        }
    }

    info!(
        category = %category.name,
        added = added.len(),
        evicted = evicted.len(),
        total = keywords.len(),
        "Trained category keywords"
    );

    Ok(TrainingResult {
        category_id,
        added,
        evicted,
        total_keywords: keywords.len(),
    })
}
