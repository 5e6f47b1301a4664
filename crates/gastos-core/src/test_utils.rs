//! Test utilities for gastos-core
//!
//! An in-memory `TransactionStore` so the engines can be exercised without
//! SQLite, including a switch that makes every call fail like an unavailable
//! store would.

use std::cell::{Cell, RefCell};

use crate::error::{Error, Result};
use crate::models::{Category, ExpenseRecord, LabeledDescription};
use crate::store::TransactionStore;

/// In-memory store backed by plain vectors
#[derive(Default)]
pub struct MemoryStore {
    categories: RefCell<Vec<Category>>,
    history: RefCell<Vec<LabeledDescription>>,
    expenses: RefCell<Vec<ExpenseRecord>>,
    failing: Cell<bool>,
    history_reads: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category with the next id and return that id
    pub fn add_category(&self, name: &str, keywords: &[&str]) -> i64 {
        let mut categories = self.categories.borrow_mut();
        let id = categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        categories.push(Category {
            id,
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        });
        id
    }

    /// Record a categorized description seen `occurrences` times
    pub fn add_history(&self, description: &str, category_id: i64, occurrences: u32) {
        self.history.borrow_mut().push(LabeledDescription {
            description: description.to_string(),
            category_id,
            occurrences,
        });
    }

    /// Replace the expense snapshot
    pub fn set_expenses(&self, expenses: Vec<ExpenseRecord>) {
        *self.expenses.borrow_mut() = expenses;
    }

    /// Make every store call fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Keywords currently stored for a category
    pub fn keywords(&self, category_id: i64) -> Vec<String> {
        self.categories
            .borrow()
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.keywords.clone())
            .unwrap_or_default()
    }

    /// How many times the labeled history has been read
    pub fn history_reads(&self) -> usize {
        self.history_reads.get()
    }

    fn check(&self) -> Result<()> {
        if self.failing.get() {
            return Err(Error::Database(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }
}

impl TransactionStore for MemoryStore {
    fn list_categories(&self) -> Result<Vec<Category>> {
        self.check()?;
        Ok(self.categories.borrow().clone())
    }

    fn list_labeled_transactions(&self) -> Result<Vec<LabeledDescription>> {
        self.check()?;
        self.history_reads.set(self.history_reads.get() + 1);
        Ok(self.history.borrow().clone())
    }

    fn list_expenses(&self) -> Result<Vec<ExpenseRecord>> {
        self.check()?;
        let mut expenses = self.expenses.borrow().clone();
        expenses.sort_by_key(|e| e.date);
        Ok(expenses)
    }

    fn update_category_keywords(&self, category_id: i64, keywords: &[String]) -> Result<bool> {
        self.check()?;
        let mut categories = self.categories.borrow_mut();
        match categories.iter_mut().find(|c| c.id == category_id) {
            Some(category) => {
                category.keywords = keywords.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
