//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `categories` - Category management commands (list, add)
//! - `classify` - Classification commands (classify, suggest, train, categorize)
//! - `core` - Core commands (init) and shared utilities (open_db, load_config)
//! - `forecast` - Expense forecast command
//! - `import` - CSV import and export commands
//! - `reports` - Classification statistics and spending patterns
//! - `transactions` - Transaction commands (add, list, delete)

pub mod categories;
pub mod classify;
pub mod core;
pub mod forecast;
pub mod import;
pub mod reports;
pub mod transactions;

// Re-export command functions for main.rs
pub use categories::*;
pub use classify::*;
pub use self::core::*;
pub use forecast::*;
pub use import::*;
pub use reports::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount the way Brazilian statements do (R$ 1.234,56)
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}
