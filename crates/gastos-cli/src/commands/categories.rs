//! Category command implementations

use anyhow::Result;
use gastos_core::Database;

pub fn cmd_categories_list(db: &Database) -> Result<()> {
    let categories = db.list_categories()?;

    if categories.is_empty() {
        println!("No categories yet. Seed the defaults with:");
        println!("  gastos init");
        return Ok(());
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────");

    for category in categories {
        println!("   [{}] {}", category.id, category.name);
        if !category.keywords.is_empty() {
            println!("       {}", category.keywords.join(", "));
        }
    }

    Ok(())
}

pub fn cmd_categories_add(db: &Database, name: &str, keywords: &[String]) -> Result<()> {
    let keywords: Vec<&str> = keywords.iter().map(String::as_str).collect();
    let id = db.create_category(name, &keywords)?;

    println!("✅ Created category '{}' (id: {})", name.trim(), id);
    Ok(())
}
