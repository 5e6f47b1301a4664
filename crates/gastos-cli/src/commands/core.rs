//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Engine configuration with optional override file
//! - `resolve_category` - Look up a category by name or id
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use gastos_core::{Category, Database, EngineConfig};

/// Open the database, creating it and its schema if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    Database::new(path_str).context("Failed to open database")
}

/// Load the engine config from `--config`, the user override file or the built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    EngineConfig::load(path).context("Failed to load engine config")
}

/// Resolve a category given as a numeric id or a (case-insensitive) name
pub fn resolve_category(db: &Database, name_or_id: &str) -> Result<Category> {
    if let Ok(id) = name_or_id.trim().parse::<i64>() {
        if let Some(category) = db.get_category(id)? {
            return Ok(category);
        }
    }
    db.get_category_by_name(name_or_id)?
        .ok_or_else(|| anyhow::anyhow!("Category not found: {}", name_or_id))
}

pub fn cmd_init(db: &Database) -> Result<()> {
    println!("🔧 Initializing database at {}...", db.path());

    let created = db
        .seed_default_categories()
        .context("Failed to seed default categories")?;
    if created > 0 {
        println!("   Seeded {} default categories", created);
    } else {
        println!("   Default categories already present");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: gastos import --file extrato.csv");
    println!("  2. Record an expense:   gastos add -d \"Uber *Trip\" -a 25.50");
    println!("  3. Forecast spending:   gastos forecast --months 3");

    Ok(())
}
