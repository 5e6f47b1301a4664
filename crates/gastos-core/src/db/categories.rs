//! Category and keyword operations

use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::Database;
use crate::classifier::normalize::normalize;
use crate::error::{Error, Result};
use crate::models::Category;

/// Categories seeded on first run, with their starter keywords
pub const DEFAULT_CATEGORIES: [(&str, &[&str]); 8] = [
    (
        "Alimentação",
        &["supermercado", "restaurante", "lanche", "comida", "padaria", "açougue"],
    ),
    (
        "Transporte",
        &["uber", "taxi", "combustível", "ônibus", "metro", "gasolina"],
    ),
    (
        "Moradia",
        &["aluguel", "condomínio", "água", "luz", "gás", "internet"],
    ),
    ("Saúde", &["farmácia", "médico", "consulta", "exame", "remédio"]),
    ("Lazer", &["cinema", "teatro", "show", "viagem", "festa", "bar"]),
    ("Educação", &["curso", "livro", "faculdade", "escola", "material"]),
    ("Vestuário", &["roupa", "calçado", "sapato", "camisa", "calça"]),
    ("Outros", &[]),
];

/// Normalize keywords like descriptions and drop empty or repeated ones, keeping first-seen order
pub(crate) fn sanitize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keywords.len());
    for kw in keywords {
        let kw = normalize(kw.as_ref());
        if !kw.is_empty() && !out.contains(&kw) {
            out.push(kw);
        }
    }
    out
}

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    let keywords_json: String = row.get(2)?;
    let keywords: Vec<String> = serde_json::from_str(&keywords_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        keywords,
    })
}

impl Database {
    /// Seed the default categories (idempotent - skips existing names)
    pub fn seed_default_categories(&self) -> Result<usize> {
        let conn = self.conn()?;
        let mut created = 0;

        for (name, keywords) in DEFAULT_CATEGORIES {
            let keywords = serde_json::to_string(&sanitize_keywords(keywords))?;
            created += conn.execute(
                "INSERT OR IGNORE INTO categories (name, keywords) VALUES (?, ?)",
                params![name, keywords],
            )?;
        }

        info!(created, "Seeded default categories");
        Ok(created)
    }

    /// Create a new category
    pub fn create_category(&self, name: &str, keywords: &[&str]) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Category name cannot be empty".into()));
        }
        if self.get_category_by_name(name)?.is_some() {
            return Err(Error::InvalidInput(format!(
                "Category '{}' already exists",
                name
            )));
        }

        let conn = self.conn()?;
        let keywords = serde_json::to_string(&sanitize_keywords(keywords))?;
        conn.execute(
            "INSERT INTO categories (name, keywords) VALUES (?, ?)",
            params![name, keywords],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Get a category by ID
    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, name, keywords FROM categories WHERE id = ?",
                params![id],
                row_to_category,
            )
            .optional()?;
        Ok(category)
    }

    /// Get a category by name (case-insensitive)
    pub fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let conn = self.conn()?;
        let category = conn
            .query_row(
                "SELECT id, name, keywords FROM categories WHERE lower(name) = lower(?)",
                params![name.trim()],
                row_to_category,
            )
            .optional()?;

        // SQLite's lower() only folds ASCII; fall back to a Unicode-aware scan
        if category.is_some() {
            return Ok(category);
        }
        let wanted = name.trim().to_lowercase();
        Ok(self
            .list_categories()?
            .into_iter()
            .find(|c| c.name.to_lowercase() == wanted))
    }

    /// List all categories in insertion order
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, keywords FROM categories ORDER BY id")?;

        let categories = stmt
            .query_map([], row_to_category)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Replace a category's keyword list. Returns false if the category does not exist.
    pub fn set_category_keywords(&self, id: i64, keywords: &[String]) -> Result<bool> {
        let conn = self.conn()?;
        let keywords = serde_json::to_string(&sanitize_keywords(keywords))?;
        let updated = conn.execute(
            "UPDATE categories SET keywords = ? WHERE id = ?",
            params![keywords, id],
        )?;
        Ok(updated > 0)
    }
}
