//! Classification command implementations

use anyhow::Result;
use gastos_core::{Classifier, Database, EngineConfig};

use super::resolve_category;

pub fn cmd_classify(db: &Database, config: &EngineConfig, description: &str) -> Result<()> {
    let classifier = Classifier::with_config(db, config.clone());

    match classifier.classify_detailed(description)? {
        Some(found) => {
            let name = db
                .get_category(found.category_id)?
                .map(|c| c.name)
                .unwrap_or_default();
            println!("🏷️  {} (matched by {})", name, found.stage);
        }
        None => {
            println!("❓ No category matched \"{}\"", description);
            println!("   Try 'gastos suggest' for ranked candidates.");
        }
    }

    Ok(())
}

pub fn cmd_suggest(
    db: &Database,
    config: &EngineConfig,
    description: &str,
    json: bool,
) -> Result<()> {
    let classifier = Classifier::with_config(db, config.clone());
    let suggestions = classifier.suggest(description)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
        return Ok(());
    }

    if suggestions.is_empty() {
        println!("No keywords in \"{}\" point to a category.", description);
        return Ok(());
    }

    println!();
    println!("💡 Suggestions for \"{}\"", description);
    println!("   ─────────────────────────────");
    for (rank, s) in suggestions.iter().enumerate() {
        println!(
            "   {}. {:<16} {:>5.1}%  ({})",
            rank + 1,
            s.category_name,
            s.confidence * 100.0,
            s.matched_keywords.join(", ")
        );
    }

    Ok(())
}

pub fn cmd_train(
    db: &Database,
    config: &EngineConfig,
    description: &str,
    category: &str,
) -> Result<()> {
    let category = resolve_category(db, category)?;
    let classifier = Classifier::with_config(db, config.clone());
    let result = classifier.train(description, category.id)?;

    if result.added.is_empty() {
        println!("ℹ️  '{}' already knows these keywords", category.name);
    } else {
        println!(
            "🎓 Taught '{}': {}",
            category.name,
            result.added.join(", ")
        );
    }
    if !result.evicted.is_empty() {
        println!("   Dropped oldest: {}", result.evicted.join(", "));
    }
    println!("   {} keywords stored", result.total_keywords);

    Ok(())
}

pub fn cmd_categorize(
    db: &Database,
    config: &EngineConfig,
    id: i64,
    category: &str,
    train: bool,
) -> Result<()> {
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;
    let category = resolve_category(db, category)?;

    db.set_transaction_category(id, Some(category.id))?;
    println!("✅ Transaction #{} → {}", id, category.name);

    if train {
        cmd_train(db, config, &tx.description, &category.id.to_string())?;
    }

    Ok(())
}
