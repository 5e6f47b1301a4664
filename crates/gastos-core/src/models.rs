//! Domain models for Gastos

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether a transaction brings money in or takes it out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "receita" => Ok(Self::Income),
            "expense" | "despesa" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    /// Always non-negative; the sign lives in `kind`
    pub amount: f64,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category_id: Option<i64>,
    pub import_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A transaction to insert
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category_id: Option<i64>,
    /// Set by CSV import for deduplication
    pub import_hash: Option<String>,
}

/// A spending category with its learned keyword list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Lowercase, non-empty, oldest first
    pub keywords: Vec<String>,
}

/// A past description that already carries a category, aggregated by exact text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDescription {
    pub description: String,
    pub category_id: i64,
    pub occurrences: u32,
}

/// A single expense as seen by the forecaster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub date: NaiveDate,
    pub amount: f64,
}

impl ExpenseRecord {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// Calendar month used to group expenses and label forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The following calendar month
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Monthly aggregate of expenses with lag and rolling-window features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub period: YearMonth,
    pub total_expense: f64,
    pub transaction_count: u32,
    pub avg_per_transaction: f64,
    pub lag1: Option<f64>,
    pub lag2: Option<f64>,
    pub lag3: Option<f64>,
    pub rolling3_avg: Option<f64>,
}

impl MonthlyAggregate {
    /// All lag and rolling features are defined
    pub fn is_usable(&self) -> bool {
        self.lag1.is_some() && self.lag2.is_some() && self.lag3.is_some() && self.rolling3_avg.is_some()
    }
}

/// Forecast for one target month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub target_period: YearMonth,
    /// Heuristic in [0, 1]
    pub confidence: f64,
}

impl ForecastResult {
    /// Interval width as a fraction of the estimate (0 when the estimate is 0)
    pub fn relative_width(&self) -> f64 {
        if self.estimate > 0.0 {
            (self.upper_bound - self.lower_bound) / self.estimate
        } else {
            0.0
        }
    }
}

/// A ranked category suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category_id: i64,
    pub category_name: String,
    pub score: f64,
    pub matched_keywords: Vec<String>,
    pub confidence: f64,
}

/// Transaction count for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// How much of the transaction store is classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub total: i64,
    pub classified: i64,
    pub unclassified: i64,
    /// Percentage, rounded to two decimals
    pub rate: f64,
    pub by_category: Vec<CategoryCount>,
}

/// Expense aggregates for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: String,
    pub average: f64,
    pub total: f64,
    pub count: i64,
}

/// Expense aggregates for one weekday (0 = Sunday)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdaySpending {
    pub weekday: u32,
    pub average: f64,
    pub count: i64,
}

/// Expense aggregates for one calendar month across all years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSpending {
    pub month: u32,
    pub average: f64,
    pub total: f64,
}

/// Spending pattern analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingPatterns {
    pub by_category: Vec<CategorySpending>,
    pub by_weekday: Vec<WeekdaySpending>,
    pub by_month: Vec<MonthSpending>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_parse() {
        assert_eq!("Receita".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!("despesa".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert_eq!("EXPENSE".parse::<TransactionKind>().unwrap(), TransactionKind::Expense);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_year_month_rollover() {
        assert_eq!(YearMonth::new(2024, 12).next(), YearMonth::new(2025, 1));
        assert_eq!(YearMonth::new(2024, 3).next(), YearMonth::new(2024, 4));
        assert_eq!(YearMonth::new(2024, 3).to_string(), "2024-03");
    }

    #[test]
    fn test_year_month_ordering() {
        assert!(YearMonth::new(2023, 12) < YearMonth::new(2024, 1));
        assert!(YearMonth::new(2024, 2) < YearMonth::new(2024, 10));
    }
}
