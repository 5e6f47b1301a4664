//! CSV import
//!
//! Accepts the export format (`id,type,category,amount,date,description`)
//! as well as Portuguese headers (`tipo,categoria,valor,data,descricao`).
//! Rows that cannot be parsed are skipped and counted rather than aborting
//! the import.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::ledger::add_transaction;
use crate::models::{NewTransaction, TransactionKind};

/// A parsed row, before category names are resolved
#[derive(Debug, Clone)]
pub struct ImportRow {
    pub transaction: NewTransaction,
    /// Category name as written in the file
    pub category: Option<String>,
}

/// Rows parsed from a file plus how many were unreadable
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub rows: Vec<ImportRow>,
    pub skipped: usize,
}

/// Summary of an import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub auto_classified: usize,
}

/// Column positions, resolved from the header row
struct Columns {
    kind: Option<usize>,
    category: Option<usize>,
    amount: usize,
    date: usize,
    description: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        let require = |names: &[&str]| {
            find(names).ok_or_else(|| {
                Error::InvalidInput(format!("CSV is missing a '{}' column", names[0]))
            })
        };

        Ok(Self {
            kind: find(&["type", "tipo"]),
            category: find(&["category", "categoria"]),
            amount: require(&["amount", "valor", "value"])?,
            date: require(&["date", "data"])?,
            description: require(&["description", "descricao", "descrição"])?,
        })
    }
}

/// Parse a transactions CSV
pub fn parse_csv<R: Read>(reader: R) -> Result<ParsedCsv> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut parsed = ParsedCsv::default();
    // Identical rows in one file are distinct transactions
    let mut seen: HashMap<String, u32> = HashMap::new();

    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping unreadable CSV row");
                parsed.skipped += 1;
                continue;
            }
        };

        match parse_row(&record, &columns) {
            Ok(mut row) => {
                let key = row_key(&row.transaction);
                let occurrence = seen.entry(key.clone()).or_insert(0);
                row.transaction.import_hash = Some(generate_hash(&key, *occurrence));
                *occurrence += 1;
                parsed.rows.push(row);
            }
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping CSV row");
                parsed.skipped += 1;
            }
        }
    }

    debug!(rows = parsed.rows.len(), skipped = parsed.skipped, "Parsed CSV");
    Ok(parsed)
}

/// Import a CSV into the database, classifying rows without a known category
pub fn import_csv<R: Read>(
    db: &Database,
    classifier: &Classifier<'_, Database>,
    reader: R,
) -> Result<ImportResult> {
    let parsed = parse_csv(reader)?;
    let mut result = ImportResult {
        skipped: parsed.skipped,
        ..Default::default()
    };

    let mut category_ids: HashMap<String, Option<i64>> = HashMap::new();

    for row in parsed.rows {
        let mut tx = row.transaction;
        if let Some(name) = row.category {
            let id = match category_ids.get(&name) {
                Some(id) => *id,
                None => {
                    let id = db.get_category_by_name(&name)?.map(|c| c.id);
                    category_ids.insert(name, id);
                    id
                }
            };
            tx.category_id = id;
        }

        match add_transaction(db, classifier, tx)? {
            Some(added) => {
                result.imported += 1;
                if added.stage.is_some() {
                    result.auto_classified += 1;
                }
            }
            None => result.duplicates += 1,
        }
    }

    info!(
        imported = result.imported,
        duplicates = result.duplicates,
        skipped = result.skipped,
        auto_classified = result.auto_classified,
        "CSV import complete"
    );
    Ok(result)
}

fn parse_row(record: &StringRecord, columns: &Columns) -> Result<ImportRow> {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let description = field(columns.description);
    if description.is_empty() {
        return Err(Error::InvalidInput("Missing description".into()));
    }

    let date = parse_date(field(columns.date))?;
    let amount = parse_amount(field(columns.amount))?;
    if amount < 0.0 {
        return Err(Error::InvalidInput(format!("Negative amount: {}", amount)));
    }

    let kind = match columns.kind.map(field).filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<TransactionKind>().map_err(Error::InvalidInput)?,
        None => TransactionKind::Expense,
    };

    let category = columns
        .category
        .map(field)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(ImportRow {
        transaction: NewTransaction {
            description: description.to_string(),
            amount,
            date,
            kind,
            category_id: None,
            import_hash: None,
        },
        category,
    })
}

/// Identity of a row for deduplication
fn row_key(tx: &NewTransaction) -> String {
    format!(
        "{}|{}|{:.2}|{}",
        tx.date,
        tx.description,
        tx.amount,
        tx.kind.as_str()
    )
}

/// Hash of a row identity and its occurrence within the file
fn generate_hash(key: &str, occurrence: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(occurrence.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`
fn parse_date(s: &str) -> Result<NaiveDate> {
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    Err(Error::InvalidInput(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, accepting `1234.56`, `1,234.56` and `1.234,56` (with or without `R$`)
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    // Whichever separator comes last is the decimal one
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned.replace(',', ""),
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidInput(format!("Unable to parse amount: {}", s)))
}
