//! Integration tests for gastos-core
//!
//! These tests exercise the full import → classify → train → forecast workflow
//! against a real SQLite database.

use chrono::NaiveDate;
use gastos_core::{
    add_transaction, classifier::Classifier, db::Database, forecast::Forecaster,
    import::import_csv, models::YearMonth, MatchStage, NewTransaction, TransactionKind,
};

/// Seven months of household spending, three expenses per month, plus salary
fn household_csv() -> String {
    let mut csv = String::from("tipo,categoria,valor,data,descricao\n");
    for month in 1..=7 {
        csv.push_str(&format!(
            "despesa,,\"1.500,00\",05/{:02}/2024,Aluguel apartamento\n",
            month
        ));
        csv.push_str(&format!(
            "despesa,,320.50,12/{:02}/2024,Supermercado Pão de Açúcar\n",
            month
        ));
        csv.push_str(&format!("despesa,,45.90,20/{:02}/2024,Uber *Trip\n", month));
        csv.push_str(&format!(
            "receita,,\"5.000,00\",01/{:02}/2024,Salário\n",
            month
        ));
    }
    csv
}

fn expense(description: &str, amount: f64, date: NaiveDate) -> NewTransaction {
    NewTransaction {
        description: description.to_string(),
        amount,
        date,
        kind: TransactionKind::Expense,
        category_id: None,
        import_hash: None,
    }
}

// =============================================================================
// Import and classification
// =============================================================================

#[test]
fn test_import_classifies_known_merchants() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    db.seed_default_categories().expect("Failed to seed categories");
    let classifier = Classifier::new(&db);

    let result = import_csv(&db, &classifier, household_csv().as_bytes()).expect("Import failed");
    assert_eq!(result.imported, 28);
    assert_eq!(result.skipped, 0);
    // Rent, groceries and rides all hit seeded keywords; salary does not
    assert_eq!(result.auto_classified, 21);

    let stats = db.classification_stats().expect("Stats failed");
    assert_eq!(stats.total, 28);
    assert_eq!(stats.classified, 21);
    assert_eq!(stats.rate, 75.0);

    let reimport = import_csv(&db, &classifier, household_csv().as_bytes()).unwrap();
    assert_eq!(reimport.imported, 0);
    assert_eq!(reimport.duplicates, 28);
}

#[test]
fn test_training_teaches_new_merchant() {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories().unwrap();
    let classifier = Classifier::new(&db);
    let lazer = db.get_category_by_name("Lazer").unwrap().unwrap();

    assert_eq!(classifier.classify("Kinoplex Tatuape sessão").unwrap(), None);

    let trained = classifier
        .train("Kinoplex Tatuape sessão", lazer.id)
        .expect("Training failed");
    assert!(trained.added.contains(&"kinoplex".to_string()));

    // The learned keyword is persisted and matched exactly from now on
    let stored = db.get_category(lazer.id).unwrap().unwrap();
    assert!(stored.keywords.contains(&"kinoplex".to_string()));

    let detailed = classifier
        .classify_detailed("KINOPLEX.COM 0042")
        .unwrap()
        .unwrap();
    assert_eq!(detailed.category_id, lazer.id);
    assert_eq!(detailed.stage, MatchStage::ExactKeyword);
}

#[test]
fn test_history_carries_manual_labels() {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories().unwrap();
    let classifier = Classifier::new(&db);
    let outros = db.get_category_by_name("Outros").unwrap().unwrap();
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    let added = add_transaction(&db, &classifier, expense("Kzq Pet Shop Aricanduva", 90.0, date))
        .unwrap()
        .unwrap();
    assert!(added.category_id.is_none());
    db.set_transaction_category(added.id, Some(outros.id)).unwrap();

    let next = add_transaction(&db, &classifier, expense("Kzq Pet Shop Aricanduv", 60.0, date))
        .unwrap()
        .unwrap();
    assert_eq!(next.category_id, Some(outros.id));
    assert_eq!(next.stage, Some(MatchStage::History));
}

#[test]
fn test_suggestions_rank_categories() {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories().unwrap();
    let classifier = Classifier::new(&db);
    let alimentacao = db.get_category_by_name("Alimentação").unwrap().unwrap();

    let suggestions = classifier.suggest("Compra no supermercado extra").unwrap();
    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 3);
    assert_eq!(suggestions[0].category_id, alimentacao.id);
    for pair in suggestions.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(suggestions
        .iter()
        .all(|s| s.confidence > 0.0 && s.confidence <= 1.0));
}

// =============================================================================
// Forecasting
// =============================================================================

#[test]
fn test_forecast_from_imported_history() {
    let db = Database::in_memory().unwrap();
    db.seed_default_categories().unwrap();
    let classifier = Classifier::new(&db);
    import_csv(&db, &classifier, household_csv().as_bytes()).unwrap();

    let forecaster = Forecaster::new();
    let next = forecaster.forecast_from_store(&db).expect("Forecast failed");

    // Every month costs 1866.40; income is ignored
    assert!((next.estimate - 1866.4).abs() < 1e-6);
    assert!(next.lower_bound <= next.estimate && next.estimate <= next.upper_bound);
    assert_eq!(next.target_period, YearMonth::new(2024, 8));

    let quarter = forecaster.forecast_multiple_from_store(&db, 3).unwrap();
    assert_eq!(quarter.len(), 3);
    assert_eq!(quarter[2].target_period, YearMonth::new(2024, 10));
    assert!(quarter.windows(2).all(|p| p[1].confidence <= p[0].confidence));
}

#[test]
fn test_forecast_needs_history() {
    let db = Database::in_memory().unwrap();
    let classifier = Classifier::new(&db);
    let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    add_transaction(&db, &classifier, expense("Mercado", 100.0, date)).unwrap();

    let err = Forecaster::new().forecast_from_store(&db).unwrap_err();
    assert!(err.is_insufficient_data());
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gastos.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::new(path).unwrap();
        db.seed_default_categories().unwrap();
        let classifier = Classifier::new(&db);
        let saude = db.get_category_by_name("Saúde").unwrap().unwrap();
        classifier.train("Drogasil unidade centro", saude.id).unwrap();
    }

    let db = Database::new(path).unwrap();
    assert_eq!(db.seed_default_categories().unwrap(), 0);
    let classifier = Classifier::new(&db);
    let saude = db.get_category_by_name("saúde").unwrap().unwrap();
    assert_eq!(classifier.classify("DROGASIL 123").unwrap(), Some(saude.id));
}
