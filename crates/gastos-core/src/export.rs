//! CSV export of transactions
//!
//! Writes `id,type,category,amount,date,description`, the same layout the
//! importer reads back.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;

use crate::db::Database;
use crate::error::Result;

/// One exported row
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: i64,
    #[serde(rename = "type")]
    kind: &'static str,
    category: &'a str,
    amount: String,
    date: String,
    description: &'a str,
}

impl Database {
    /// Write every transaction as CSV, oldest first. Returns the number of rows written.
    pub fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let names: HashMap<i64, String> = self
            .list_categories()?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let transactions = self.list_all_transactions()?;

        // Header is written explicitly so an empty export still has one
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(["id", "type", "category", "amount", "date", "description"])?;

        for tx in &transactions {
            let category = tx
                .category_id
                .and_then(|id| names.get(&id))
                .map(String::as_str)
                .unwrap_or("");
            wtr.serialize(ExportRow {
                id: tx.id,
                kind: tx.kind.as_str(),
                category,
                amount: format!("{:.2}", tx.amount),
                date: tx.date.to_string(),
                description: &tx.description,
            })?;
        }

        wtr.flush()?;
        tracing::debug!(rows = transactions.len(), "Exported transactions");
        Ok(transactions.len())
    }
}
