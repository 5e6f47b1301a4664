//! The matcher strategies that make up the classification cascade

use tracing::debug;

use super::keywords::{matches_in, KEYWORD_TABLE};
use super::normalize::normalize;
use super::similarity::ratio;
use super::{MatchContext, MatchStage};
use crate::error::Result;

/// One stage of the classification cascade
pub trait Matcher: Send + Sync {
    /// Stage reported when this matcher succeeds
    fn stage(&self) -> MatchStage;

    /// Try to find a category for the description in `ctx`
    fn attempt(&self, ctx: &MatchContext<'_>) -> Result<Option<i64>>;
}

/// A learned keyword appears verbatim in the description.
///
/// Categories are tried in store order, so earlier categories win when
/// several keywords match.
pub struct ExactKeywordMatcher;

impl Matcher for ExactKeywordMatcher {
    fn stage(&self) -> MatchStage {
        MatchStage::ExactKeyword
    }

    fn attempt(&self, ctx: &MatchContext<'_>) -> Result<Option<i64>> {
        for category in ctx.categories {
            let hit = category
                .keywords
                .iter()
                .map(|kw| normalize(kw))
                .any(|kw| !kw.is_empty() && ctx.normalized.contains(kw.as_str()));
            if hit {
                return Ok(Some(category.id));
            }
        }
        Ok(None)
    }
}

/// The whole description is similar to a single learned keyword
pub struct FuzzyKeywordMatcher {
    threshold: f64,
}

impl FuzzyKeywordMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Matcher for FuzzyKeywordMatcher {
    fn stage(&self) -> MatchStage {
        MatchStage::FuzzyKeyword
    }

    fn attempt(&self, ctx: &MatchContext<'_>) -> Result<Option<i64>> {
        let mut best_similarity = 0.0;
        let mut best = None;

        for category in ctx.categories {
            for kw in &category.keywords {
                let similarity = ratio(ctx.normalized, &normalize(kw));
                // Strict on both sides: the first pair to reach a score keeps it
                if similarity > best_similarity && similarity > self.threshold {
                    best_similarity = similarity;
                    best = Some(category.id);
                }
            }
        }

        Ok(best)
    }
}

/// Scores the built-in keyword table.
///
/// Each table category scores `sum(len(matched)) * count(matched)`, so longer
/// and more numerous hits win. Only categories present in the store compete;
/// ties keep the earlier table entry.
pub struct KeywordTableMatcher;

impl KeywordTableMatcher {
    /// Score of one table entry against a normalized description (0 when nothing matches)
    pub fn score(normalized: &str, keywords: &[&str]) -> usize {
        let found = matches_in(normalized, keywords);
        let total_len: usize = found.iter().map(|kw| kw.chars().count()).sum();
        total_len * found.len()
    }
}

impl Matcher for KeywordTableMatcher {
    fn stage(&self) -> MatchStage {
        MatchStage::KeywordTable
    }

    fn attempt(&self, ctx: &MatchContext<'_>) -> Result<Option<i64>> {
        let mut best_score = 0;
        let mut best = None;

        for (name, keywords) in KEYWORD_TABLE {
            let Some(&category_id) = ctx.ids_by_name.get(name) else {
                continue;
            };
            let score = Self::score(ctx.normalized, keywords);
            if score > best_score {
                best_score = score;
                best = Some(category_id);
            }
        }

        Ok(best)
    }
}

/// The description is similar to one that was already categorized.
///
/// Frequent descriptions get a bonus: `similarity * (1 + occurrences * weight)`,
/// but only candidates whose raw similarity clears the threshold count.
pub struct HistoryMatcher {
    threshold: f64,
    frequency_weight: f64,
}

impl HistoryMatcher {
    pub fn new(threshold: f64, frequency_weight: f64) -> Self {
        Self {
            threshold,
            frequency_weight,
        }
    }
}

impl Matcher for HistoryMatcher {
    fn stage(&self) -> MatchStage {
        MatchStage::History
    }

    fn attempt(&self, ctx: &MatchContext<'_>) -> Result<Option<i64>> {
        // Loaded only when the cheaper stages have failed
        let history = ctx.store.list_labeled_transactions()?;
        debug!(candidates = history.len(), "Matching against history");

        let mut best_score = 0.0;
        let mut best = None;

        for labeled in &history {
            let similarity = ratio(ctx.normalized, &normalize(&labeled.description));
            if similarity <= self.threshold {
                continue;
            }
            let score = similarity * (1.0 + f64::from(labeled.occurrences) * self.frequency_weight);
            if score > best_score {
                best_score = score;
                best = Some(labeled.category_id);
            }
        }

        Ok(best)
    }
}
