//! Classification statistics and spending analytics

use rusqlite::Connection;

use super::Database;
use crate::error::Result;
use crate::models::*;

/// Round to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Database {
    /// How many transactions carry a category, overall and per category
    pub fn classification_stats(&self) -> Result<ClassificationStats> {
        let conn = self.conn()?;

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        let classified: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE category_id IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        // LEFT JOIN keeps categories nobody has used yet
        let mut stmt = conn.prepare(
            r#"
            SELECT c.name, COUNT(t.id) AS count
            FROM categories c
            LEFT JOIN transactions t ON t.category_id = c.id
            GROUP BY c.id, c.name
            ORDER BY count DESC, c.id ASC
            "#,
        )?;
        let by_category = stmt
            .query_map([], |row| {
                Ok(CategoryCount {
                    category: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let rate = if total > 0 {
            round2(classified as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        Ok(ClassificationStats {
            total,
            classified,
            unclassified: total - classified,
            rate,
            by_category,
        })
    }

    /// Expense aggregates by category, weekday and calendar month
    pub fn spending_patterns(&self) -> Result<SpendingPatterns> {
        let conn = self.conn()?;

        Ok(SpendingPatterns {
            by_category: spending_by_category(&conn)?,
            by_weekday: spending_by_weekday(&conn)?,
            by_month: spending_by_month(&conn)?,
        })
    }

    /// Total expenses per `YYYY-MM`, oldest first
    pub fn monthly_expense_totals(&self) -> Result<Vec<(String, f64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT strftime('%Y-%m', date) AS period, SUM(amount)
            FROM transactions
            WHERE kind = 'expense'
            GROUP BY period
            ORDER BY period ASC
            "#,
        )?;

        let totals = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }
}

fn spending_by_category(conn: &Connection) -> Result<Vec<CategorySpending>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT c.name, AVG(t.amount), SUM(t.amount), COUNT(t.id)
        FROM transactions t
        JOIN categories c ON c.id = t.category_id
        WHERE t.kind = 'expense'
        GROUP BY c.id, c.name
        ORDER BY SUM(t.amount) DESC
        "#,
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(CategorySpending {
                category: row.get(0)?,
                average: round2(row.get(1)?),
                total: round2(row.get(2)?),
                count: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn spending_by_weekday(conn: &Connection) -> Result<Vec<WeekdaySpending>> {
    // strftime('%w') yields 0 for Sunday through 6 for Saturday
    let mut stmt = conn.prepare(
        r#"
        SELECT CAST(strftime('%w', date) AS INTEGER) AS weekday, AVG(amount), COUNT(*)
        FROM transactions
        WHERE kind = 'expense'
        GROUP BY weekday
        ORDER BY weekday ASC
        "#,
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(WeekdaySpending {
                weekday: row.get(0)?,
                average: round2(row.get(1)?),
                count: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn spending_by_month(conn: &Connection) -> Result<Vec<MonthSpending>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT CAST(strftime('%m', date) AS INTEGER) AS month, AVG(amount), SUM(amount)
        FROM transactions
        WHERE kind = 'expense'
        GROUP BY month
        ORDER BY SUM(amount) DESC
        "#,
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MonthSpending {
                month: row.get(0)?,
                average: round2(row.get(1)?),
                total: round2(row.get(2)?),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
