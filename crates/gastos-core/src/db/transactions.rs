//! Transaction operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{ExpenseRecord, LabeledDescription, NewTransaction, Transaction};

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(3)?;
    let kind_str: String = row.get(4)?;
    let created_at_str: String = row.get(7)?;
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: parse_date(&date_str)?,
        kind: kind_str.parse().unwrap_or_default(),
        category_id: row.get(5)?,
        import_hash: row.get(6)?,
        created_at: parse_datetime(&created_at_str),
    })
}

const TRANSACTION_COLUMNS: &str =
    "id, description, amount, date, kind, category_id, import_hash, created_at";

impl Database {
    /// Insert a transaction
    ///
    /// Returns `None` when a transaction with the same import hash already exists.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Option<i64>> {
        if tx.description.trim().is_empty() {
            return Err(Error::InvalidInput("Description cannot be empty".into()));
        }
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Amount must be a non-negative number, got {}",
                tx.amount
            )));
        }

        let conn = self.conn()?;

        if let Some(ref hash) = tx.import_hash {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE import_hash = ?",
                    params![hash],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Ok(None); // Duplicate, skip
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (description, amount, kind, date, category_id, import_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.description.trim(),
                tx.amount,
                tx.kind.as_str(),
                tx.date.to_string(),
                tx.category_id,
                tx.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Get a transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);
        let tx = conn
            .query_row(&sql, params![id], row_to_transaction)
            .optional()?;
        Ok(tx)
    }

    /// List transactions, newest first
    pub fn list_transactions(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions ORDER BY date DESC, id DESC LIMIT ? OFFSET ?",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let txs = stmt
            .query_map(params![limit, offset], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(txs)
    }

    /// List every transaction, oldest first (used by export)
    pub fn list_all_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions ORDER BY date ASC, id ASC",
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let txs = stmt
            .query_map([], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(txs)
    }

    /// Delete a transaction. Returns false if it did not exist.
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Set (or clear) the category of a transaction
    pub fn set_transaction_category(&self, id: i64, category_id: Option<i64>) -> Result<()> {
        if let Some(cid) = category_id {
            if self.get_category(cid)?.is_none() {
                return Err(Error::InvalidInput(format!("Unknown category id {}", cid)));
            }
        }

        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE transactions SET category_id = ? WHERE id = ?",
            params![category_id, id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }
        Ok(())
    }

    /// Categorized descriptions with how often each (description, category) pair occurs
    pub fn list_labeled_descriptions(&self) -> Result<Vec<LabeledDescription>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT description, category_id, COUNT(*) AS occurrences
            FROM transactions
            WHERE category_id IS NOT NULL
            GROUP BY description, category_id
            ORDER BY occurrences DESC, MIN(id) ASC
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LabeledDescription {
                    description: row.get(0)?,
                    category_id: row.get(1)?,
                    occurrences: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Expense records ordered by date
    pub fn list_expense_records(&self) -> Result<Vec<ExpenseRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT date, amount FROM transactions WHERE kind = 'expense' ORDER BY date ASC, id ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let date_str: String = row.get(0)?;
                Ok(ExpenseRecord {
                    date: parse_date(&date_str)?,
                    amount: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Count all transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}
