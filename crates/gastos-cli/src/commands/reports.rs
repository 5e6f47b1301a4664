//! Report command implementations

use anyhow::Result;
use gastos_core::Database;

use super::format_brl;

const WEEKDAYS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];
const MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

pub fn cmd_stats(db: &Database, json: bool) -> Result<()> {
    let stats = db.classification_stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("📊 Classification");
    println!("   ─────────────────────────────");
    println!("   Transactions:   {}", stats.total);
    println!("   Categorized:    {}", stats.classified);
    println!("   Uncategorized:  {}", stats.unclassified);
    println!("   Rate:           {:.2}%", stats.rate);

    if !stats.by_category.is_empty() {
        println!();
        for entry in &stats.by_category {
            println!("   {:<16} {:>6}", entry.category, entry.count);
        }
    }

    Ok(())
}

pub fn cmd_patterns(db: &Database, json: bool) -> Result<()> {
    let patterns = db.spending_patterns()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&patterns)?);
        return Ok(());
    }

    if patterns.by_category.is_empty()
        && patterns.by_weekday.is_empty()
        && patterns.by_month.is_empty()
    {
        println!("No expenses recorded yet.");
        return Ok(());
    }

    println!();
    println!("💸 Spending by Category");
    println!("   ─────────────────────────────────────────────");
    for c in &patterns.by_category {
        println!(
            "   {:<16} {:>16}  avg {:>14}  ({} tx)",
            c.category,
            format_brl(c.total),
            format_brl(c.average),
            c.count
        );
    }

    println!();
    println!("📅 Average by Weekday");
    println!("   ─────────────────────────────────────────────");
    for w in &patterns.by_weekday {
        let day = WEEKDAYS.get(w.weekday as usize).copied().unwrap_or("?");
        println!("   {:<4} {:>14}  ({} tx)", day, format_brl(w.average), w.count);
    }

    println!();
    println!("🗓️  Spending by Month");
    println!("   ─────────────────────────────────────────────");
    for m in &patterns.by_month {
        let month = m
            .month
            .checked_sub(1)
            .and_then(|i| MONTHS.get(i as usize))
            .copied()
            .unwrap_or("?");
        println!(
            "   {:<4} {:>16}  avg {:>14}",
            month,
            format_brl(m.total),
            format_brl(m.average)
        );
    }

    Ok(())
}
