//! Suggestion ranking for manual categorization

use std::cmp::Ordering;

use super::keywords::{matches_in, table_keywords};
use super::normalize::normalize;
use crate::config::ClassifierConfig;
use crate::models::{Category, Suggestion};

/// Score every category against a normalized description and keep the best few.
///
/// Learned keywords count their length; built-in table keywords count their
/// length times `table_keyword_weight`. Zero scores are dropped and equal
/// scores keep category order.
pub(crate) fn rank(
    normalized: &str,
    categories: &[Category],
    config: &ClassifierConfig,
) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = categories
        .iter()
        .filter_map(|category| score_category(normalized, category, config))
        .collect();

    // Vec::sort_by is stable
    suggestions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    suggestions.truncate(config.suggestion_limit);
    suggestions
}

fn score_category(
    normalized: &str,
    category: &Category,
    config: &ClassifierConfig,
) -> Option<Suggestion> {
    let mut score = 0.0;
    let mut matched: Vec<String> = Vec::new();

    for kw in &category.keywords {
        let kw = normalize(kw);
        if !kw.is_empty() && normalized.contains(kw.as_str()) {
            score += kw.chars().count() as f64;
            matched.push(kw);
        }
    }

    if let Some(table) = table_keywords(&category.name) {
        for kw in matches_in(normalized, table) {
            score += kw.chars().count() as f64 * config.table_keyword_weight;
            if !matched.iter().any(|m| m == kw) {
                matched.push(kw.to_string());
            }
        }
    }

    if score <= 0.0 {
        return None;
    }

    Some(Suggestion {
        category_id: category.id,
        category_name: category.name.clone(),
        score,
        matched_keywords: matched,
        confidence: (score / config.confidence_divisor).clamp(0.0, 1.0),
    })
}
