//! Transaction command implementations

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use gastos_core::{
    add_transaction, Classifier, Database, EngineConfig, NewTransaction, TransactionKind,
};

use super::{format_brl, resolve_category, truncate};

/// Parse a `YYYY-MM-DD` date, defaulting to today
pub fn parse_date_arg(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD)", s)),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn cmd_add(
    db: &Database,
    config: &EngineConfig,
    description: &str,
    amount: f64,
    date: Option<&str>,
    kind: &str,
    category: Option<&str>,
) -> Result<()> {
    let kind: TransactionKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let category_id = category
        .map(|c| resolve_category(db, c))
        .transpose()?
        .map(|c| c.id);

    let tx = NewTransaction {
        description: description.to_string(),
        amount,
        date: parse_date_arg(date)?,
        kind,
        category_id,
        import_hash: None,
    };

    let classifier = Classifier::with_config(db, config.clone());
    let added = add_transaction(db, &classifier, tx)?
        .ok_or_else(|| anyhow::anyhow!("Transaction was not recorded (duplicate)"))?;

    println!("✅ Recorded transaction #{}", added.id);
    match (added.category_id, added.stage) {
        (Some(id), Some(stage)) => {
            let name = db.get_category(id)?.map(|c| c.name).unwrap_or_default();
            println!("   🏷️  Category: {} (matched by {})", name, stage);
        }
        (Some(id), None) => {
            let name = db.get_category(id)?.map(|c| c.name).unwrap_or_default();
            println!("   🏷️  Category: {}", name);
        }
        (None, _) => {
            println!("   ❓ No category matched.");
            println!(
                "   Use 'gastos categorize {} <category> --train' to teach it.",
                added.id
            );
        }
    }

    Ok(())
}

pub fn cmd_list(db: &Database, limit: i64, offset: i64) -> Result<()> {
    let transactions = db.list_transactions(limit, offset)?;

    if transactions.is_empty() {
        println!("No transactions found. Add one or import a file with:");
        println!("  gastos import --file extrato.csv");
        return Ok(());
    }

    let names: std::collections::HashMap<i64, String> = db
        .list_categories()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.kind {
            TransactionKind::Expense => format!("\x1b[31m-{}\x1b[0m", format_brl(tx.amount)),
            TransactionKind::Income => format!("\x1b[32m+{}\x1b[0m", format_brl(tx.amount)),
        };
        let category = tx
            .category_id
            .and_then(|id| names.get(&id))
            .map(String::as_str)
            .unwrap_or("-");

        println!(
            "   [{}] {} │ {:>22} │ {:<14} │ {}",
            tx.id,
            tx.date,
            amount_str,
            truncate(category, 14),
            truncate(&tx.description, 35)
        );
    }

    Ok(())
}

pub fn cmd_delete(db: &Database, id: i64) -> Result<()> {
    let tx = db
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    db.delete_transaction(id)?;
    println!("🗑️  Deleted transaction #{}: {}", id, tx.description);

    Ok(())
}
