//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Gastos - Track, categorize and forecast your expenses
#[derive(Parser)]
#[command(name = "gastos")]
#[command(about = "Personal expense tracker with automatic categorization", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "gastos.db", global = true)]
    pub db: PathBuf,

    /// Engine config file (defaults to the user data directory, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed the default categories
    Init,

    /// Record a transaction (category is inferred when not given)
    Add {
        /// Free-text description, e.g. "Uber *Trip"
        #[arg(short, long)]
        description: String,

        /// Amount (always positive; use --kind for income)
        #[arg(short, long)]
        amount: f64,

        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Transaction type: expense or income
        #[arg(short, long, default_value = "expense")]
        kind: String,

        /// Category name or id
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Number of transactions to skip
        #[arg(long, default_value = "0")]
        offset: i64,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },

    /// Set the category of a stored transaction
    Categorize {
        /// Transaction ID
        id: i64,

        /// Category name or id
        category: String,

        /// Also learn keywords from the transaction's description
        #[arg(long)]
        train: bool,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoriesAction>,
    },

    /// Show which category a description would be assigned
    Classify {
        /// Description to classify
        description: String,
    },

    /// Rank the most likely categories for a description
    Suggest {
        /// Description to rank categories for
        description: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Teach a category the keywords of a description
    Train {
        /// Category name or id
        category: String,

        /// Description to learn from
        description: String,
    },

    /// Forecast upcoming monthly expenses
    Forecast {
        /// Number of months to forecast
        #[arg(short, long, default_value = "1")]
        months: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how many transactions are categorized
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show spending by category, weekday and month
    Patterns {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import transactions from CSV
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Export all transactions as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// List categories with their keywords
    List,

    /// Create a category
    Add {
        /// Category name
        name: String,

        /// Comma-separated starter keywords
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
    },
}
