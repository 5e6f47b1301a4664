//! Forecaster tests

use chrono::NaiveDate;

use super::*;
use crate::config::ConfidenceStep;
use crate::models::YearMonth;
use crate::test_utils::MemoryStore;

/// One expense per month starting at `year-month`, with the given totals
fn monthly(year: i32, month: u32, totals: &[f64]) -> Vec<ExpenseRecord> {
    let mut period = YearMonth::new(year, month);
    let mut out = Vec::with_capacity(totals.len());
    for total in totals {
        let date = NaiveDate::from_ymd_opt(period.year, period.month, 10).unwrap();
        out.push(ExpenseRecord::new(date, *total));
        period = period.next();
    }
    out
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_insufficient_data() {
    let forecaster = Forecaster::new();

    // Six months give only three usable rows
    let err = forecaster
        .forecast(&monthly(2024, 1, &[100.0; 6]))
        .unwrap_err();
    match err {
        Error::InsufficientData {
            required,
            available,
        } => {
            assert_eq!(required, 4);
            assert_eq!(available, 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = forecaster.forecast(&[]).unwrap_err();
    assert!(err.is_insufficient_data());

    let err = forecaster
        .forecast_multiple(&monthly(2024, 1, &[100.0; 2]), 3)
        .unwrap_err();
    assert!(err.is_insufficient_data());
}

#[test]
fn test_flat_history_forecast() {
    let forecaster = Forecaster::new();
    // Seven months of 1000 leave four usable rows
    let result = forecaster.forecast(&monthly(2024, 1, &[1000.0; 7])).unwrap();

    assert!(close(result.estimate, 1000.0));
    assert!(close(result.lower_bound, 850.0));
    assert!(close(result.upper_bound, 1150.0));
    assert!(result.lower_bound <= result.estimate && result.estimate <= result.upper_bound);
    assert_eq!(result.confidence, 0.5);
    assert_eq!(result.target_period, YearMonth::new(2024, 8));
}

#[test]
fn test_confidence_steps() {
    let config = ForecastConfig::default();
    assert_eq!(config.history_confidence(2), 0.3);
    assert_eq!(config.history_confidence(3), 0.5);
    assert_eq!(config.history_confidence(5), 0.5);
    assert_eq!(config.history_confidence(6), 0.7);
    assert_eq!(config.history_confidence(11), 0.7);
    assert_eq!(config.history_confidence(12), 0.9);
    assert_eq!(config.history_confidence(40), 0.9);
}

#[test]
fn test_step_confidence_decays_to_floor() {
    let config = ForecastConfig::default();
    assert!((config.step_confidence(1) - 0.65).abs() < 1e-9);
    assert!((config.step_confidence(2) - 0.5).abs() < 1e-9);
    assert_eq!(config.step_confidence(4), 0.3);
    assert_eq!(config.step_confidence(10), 0.3);
}

#[test]
fn test_custom_confidence_steps_flow_into_forecast() {
    let config = ForecastConfig {
        confidence_steps: vec![ConfidenceStep { min_rows: 4, confidence: 0.42 }],
        step_confidence_start: 0.4,
        step_confidence_decay: 0.0,
        ..ForecastConfig::default()
    };
    let forecaster = Forecaster::with_config(config);
    let results = forecaster.forecast_multiple(&monthly(2024, 1, &[1000.0; 7]), 2).unwrap();

    assert_eq!(results[0].confidence, 0.42);
    assert_eq!(results[1].confidence, 0.4);
}

#[test]
fn test_target_period_rolls_over_year() {
    let forecaster = Forecaster::new();
    let results = forecaster
        .forecast_multiple(&monthly(2024, 6, &[500.0; 7]), 3)
        .unwrap();

    let targets: Vec<YearMonth> = results.iter().map(|r| r.target_period).collect();
    assert_eq!(
        targets,
        vec![
            YearMonth::new(2025, 1),
            YearMonth::new(2025, 2),
            YearMonth::new(2025, 3)
        ]
    );
}

#[test]
fn test_estimate_never_negative() {
    let forecaster = Forecaster::new();
    let histories: Vec<Vec<f64>> = vec![
        // Steep decline that a linear fit extrapolates below zero
        vec![5000.0, 4000.0, 3000.0, 2000.0, 1000.0, 500.0, 100.0, 10.0],
        vec![10.0, 3000.0, 5.0, 4000.0, 1.0, 6000.0, 0.5, 9000.0, 0.1],
        vec![0.0; 8],
        vec![100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 20.0, 10.0, 5.0, 1.0],
    ];

    for totals in histories {
        let expenses = monthly(2023, 1, &totals);
        let one = forecaster.forecast(&expenses).unwrap();
        assert!(one.estimate >= 0.0, "{:?}", totals);
        assert!(one.lower_bound >= 0.0);
        assert!(one.lower_bound <= one.estimate && one.estimate <= one.upper_bound);

        for step in forecaster.forecast_multiple(&expenses, 4).unwrap() {
            assert!(step.estimate >= 0.0);
            assert!(step.lower_bound >= 0.0);
            assert!(step.lower_bound <= step.estimate && step.estimate <= step.upper_bound);
        }
    }
}

#[test]
fn test_multiple_months_widen_and_decay() {
    let forecaster = Forecaster::new();
    let totals: Vec<f64> = (0..15).map(|i| 1000.0 + 25.0 * i as f64).collect();
    let results = forecaster
        .forecast_multiple(&monthly(2023, 1, &totals), 3)
        .unwrap();

    assert_eq!(results.len(), 3);
    for pair in results.windows(2) {
        assert!(pair[1].relative_width() >= pair[0].relative_width() - 1e-12);
        assert!(pair[1].confidence <= pair[0].confidence);
    }

    // 12 usable rows: 0.9, then the decay schedule
    assert_eq!(results[0].confidence, 0.9);
    assert!(close(results[1].confidence, 0.65));
    assert!(close(results[2].confidence, 0.5));
    assert!(close(results[1].relative_width(), 0.4));
}

#[test]
fn test_multiple_months_confidence_capped_by_first_step() {
    let forecaster = Forecaster::new();
    let results = forecaster
        .forecast_multiple(&monthly(2024, 1, &[1000.0; 7]), 3)
        .unwrap();

    // First step has only 0.5; later steps may not exceed it
    assert_eq!(results[0].confidence, 0.5);
    assert_eq!(results[1].confidence, 0.5);
    assert_eq!(results[2].confidence, 0.5);
}

#[test]
fn test_flat_trend_keeps_estimate() {
    let forecaster = Forecaster::new();
    let results = forecaster
        .forecast_multiple(&monthly(2024, 1, &[1000.0; 7]), 3)
        .unwrap();

    assert!(close(results[1].estimate, results[0].estimate));
    assert!(close(results[1].lower_bound, 800.0));
    assert!(close(results[1].upper_bound, 1200.0));
}

#[test]
fn test_growth_trend_compounds() {
    let forecaster = Forecaster::new();
    // Every month 10% above the one before
    let totals: Vec<f64> = (0..10).map(|i| 1000.0 * 1.1f64.powi(i)).collect();
    let results = forecaster
        .forecast_multiple(&monthly(2024, 1, &totals), 3)
        .unwrap();

    assert!(close(results[1].estimate, results[0].estimate * 1.1));
    assert!(close(results[2].estimate, results[1].estimate * 1.1));
}

#[test]
fn test_zero_months_is_empty() {
    let forecaster = Forecaster::new();
    assert!(forecaster
        .forecast_multiple(&monthly(2024, 1, &[1.0; 7]), 0)
        .unwrap()
        .is_empty());
}

#[test]
fn test_holdout_diagnostics() {
    let forecaster = Forecaster::new();
    let totals: Vec<f64> = (0..10).map(|i| 800.0 + 10.0 * i as f64).collect();
    forecaster.forecast(&monthly(2024, 1, &totals)).unwrap();

    // Seven usable rows: the two most recent are held out
    let diagnostics = forecaster.diagnostics().unwrap();
    assert_eq!(diagnostics.training_rows, 5);
    assert_eq!(diagnostics.holdout_rows, 2);
    assert!(diagnostics.mae.unwrap() >= 0.0);
    assert!(diagnostics.rmse.unwrap() >= diagnostics.mae.unwrap() - 1e-9);
}

#[test]
fn test_no_holdout_with_few_rows() {
    let forecaster = Forecaster::new();
    forecaster.forecast(&monthly(2024, 1, &[1000.0; 9])).unwrap();

    let diagnostics = forecaster.diagnostics().unwrap();
    assert_eq!(diagnostics.training_rows, 6);
    assert_eq!(diagnostics.holdout_rows, 0);
    assert!(diagnostics.mae.is_none());
}

#[test]
fn test_model_cache_reuse_and_invalidation() {
    let forecaster = Forecaster::new();
    let expenses = monthly(2024, 1, &[1000.0, 1100.0, 900.0, 1050.0, 980.0, 1020.0, 1010.0]);

    assert!(forecaster.cache.is_empty());
    let first = forecaster.forecast(&expenses).unwrap();
    assert!(!forecaster.cache.is_empty());

    let second = forecaster.forecast(&expenses).unwrap();
    assert_eq!(first, second);

    forecaster.invalidate();
    assert!(forecaster.cache.is_empty());
    let third = forecaster.forecast(&expenses).unwrap();
    assert_eq!(first, third);
}

#[test]
fn test_fingerprint_tracks_snapshot() {
    let a = usable_rows(&build_monthly_aggregates(&monthly(2024, 1, &[1000.0; 7])));
    let b = usable_rows(&build_monthly_aggregates(&monthly(2024, 1, &[1000.0; 7])));
    let mut changed = monthly(2024, 1, &[1000.0; 7]);
    changed.push(ExpenseRecord::new(
        NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
        1.0,
    ));
    let c = usable_rows(&build_monthly_aggregates(&changed));

    assert_eq!(fingerprint(&a), fingerprint(&b));
    assert_ne!(fingerprint(&a), fingerprint(&c));
    assert_eq!(fingerprint(&a).len(), 64);
}

#[test]
fn test_forecast_from_store() {
    let store = MemoryStore::new();
    store.set_expenses(monthly(2024, 1, &[1000.0; 7]));
    let forecaster = Forecaster::new();

    let result = forecaster.forecast_from_store(&store).unwrap();
    assert!(close(result.estimate, 1000.0));

    let results = forecaster.forecast_multiple_from_store(&store, 3).unwrap();
    assert_eq!(results.len(), 3);

    store.set_failing(true);
    assert!(forecaster
        .forecast_from_store(&store)
        .unwrap_err()
        .is_store_unavailable());
}

#[test]
fn test_configured_margins() {
    let mut config = ForecastConfig::default();
    config.next_month_margin = 0.5;
    config.min_usable_rows = 2;
    let forecaster = Forecaster::with_config(config);

    let result = forecaster.forecast(&monthly(2024, 1, &[200.0; 5])).unwrap();
    assert!(close(result.lower_bound, 100.0));
    assert!(close(result.upper_bound, 300.0));
    assert_eq!(result.confidence, 0.3);
}
