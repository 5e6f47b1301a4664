//! The contract between the engines and whatever persists transactions
//!
//! The classifier and forecaster never talk to SQLite directly; they read
//! snapshots through this trait and write back only learned keywords.

use crate::error::Result;
use crate::models::{Category, ExpenseRecord, LabeledDescription};

pub trait TransactionStore {
    /// Categories in a stable order (earlier categories win exact-match ties)
    fn list_categories(&self) -> Result<Vec<Category>>;

    /// Categorized descriptions, aggregated by exact description text
    fn list_labeled_transactions(&self) -> Result<Vec<LabeledDescription>>;

    /// Expense records ordered ascending by date
    fn list_expenses(&self) -> Result<Vec<ExpenseRecord>>;

    /// Replace a category's keyword list. Returns false if the category does not exist.
    fn update_category_keywords(&self, category_id: i64, keywords: &[String]) -> Result<bool>;
}
