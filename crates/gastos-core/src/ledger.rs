//! Recording transactions with automatic categorization

use serde::Serialize;
use tracing::debug;

use crate::classifier::{Classifier, MatchStage};
use crate::db::Database;
use crate::error::Result;
use crate::models::NewTransaction;
use crate::store::TransactionStore;

/// A stored transaction and how its category was decided
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddedTransaction {
    pub id: i64,
    pub category_id: Option<i64>,
    /// Set when the classifier picked the category
    pub stage: Option<MatchStage>,
}

/// Insert a transaction, classifying its description when no category was given.
///
/// Returns `None` when the import hash marks it as a duplicate.
pub fn add_transaction<S: TransactionStore>(
    db: &Database,
    classifier: &Classifier<'_, S>,
    mut tx: NewTransaction,
) -> Result<Option<AddedTransaction>> {
    let mut stage = None;
    if tx.category_id.is_none() {
        if let Some(found) = classifier.classify_detailed(&tx.description)? {
            tx.category_id = Some(found.category_id);
            stage = Some(found.stage);
        }
    }

    let Some(id) = db.insert_transaction(&tx)? else {
        return Ok(None);
    };

    debug!(id, category_id = ?tx.category_id, stage = ?stage, "Added transaction");
    Ok(Some(AddedTransaction {
        id,
        category_id: tx.category_id,
        stage,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use chrono::NaiveDate;

    fn new_tx(description: &str, category_id: Option<i64>) -> NewTransaction {
        NewTransaction {
            description: description.to_string(),
            amount: 42.0,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            kind: TransactionKind::Expense,
            category_id,
            import_hash: None,
        }
    }

    #[test]
    fn test_add_transaction_auto_classifies() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();
        let classifier = Classifier::new(&db);

        let added = add_transaction(&db, &classifier, new_tx("Uber *Trip", None))
            .unwrap()
            .unwrap();
        let transporte = db.get_category_by_name("Transporte").unwrap().unwrap();

        assert_eq!(added.category_id, Some(transporte.id));
        assert_eq!(added.stage, Some(MatchStage::ExactKeyword));
        assert_eq!(
            db.get_transaction(added.id).unwrap().unwrap().category_id,
            Some(transporte.id)
        );
    }

    #[test]
    fn test_add_transaction_keeps_explicit_category() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();
        let classifier = Classifier::new(&db);
        let lazer = db.get_category_by_name("Lazer").unwrap().unwrap();

        let added = add_transaction(&db, &classifier, new_tx("Uber *Trip", Some(lazer.id)))
            .unwrap()
            .unwrap();
        assert_eq!(added.category_id, Some(lazer.id));
        assert!(added.stage.is_none());
    }

    #[test]
    fn test_add_transaction_unclassified() {
        let db = Database::in_memory().unwrap();
        db.seed_default_categories().unwrap();
        let classifier = Classifier::new(&db);

        let added = add_transaction(&db, &classifier, new_tx("qwerty", None))
            .unwrap()
            .unwrap();
        assert!(added.category_id.is_none());
        assert!(added.stage.is_none());
    }

    #[test]
    fn test_add_transaction_duplicate_hash() {
        let db = Database::in_memory().unwrap();
        let classifier = Classifier::new(&db);

        let mut tx = new_tx("Padaria", None);
        tx.import_hash = Some("h1".into());
        assert!(add_transaction(&db, &classifier, tx.clone()).unwrap().is_some());
        assert!(add_transaction(&db, &classifier, tx).unwrap().is_none());
    }
}
