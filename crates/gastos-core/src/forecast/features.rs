//! Monthly aggregates with lag and rolling-window features

use std::collections::BTreeMap;

use crate::models::{ExpenseRecord, MonthlyAggregate, YearMonth};

/// Inputs to the regression, in column order
pub const FEATURE_NAMES: [&str; 7] = [
    "month",
    "transaction_count",
    "avg_per_transaction",
    "lag1",
    "lag2",
    "lag3",
    "rolling3_avg",
];

/// Group expenses by calendar month and derive the lag/rolling features.
///
/// Rows come out ascending by period. Months without expenses are simply
/// absent; lags refer to the preceding *rows*, not calendar months.
pub fn build_monthly_aggregates(expenses: &[ExpenseRecord]) -> Vec<MonthlyAggregate> {
    let mut by_month: BTreeMap<YearMonth, (f64, u32)> = BTreeMap::new();
    for expense in expenses {
        let entry = by_month.entry(YearMonth::of(expense.date)).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let totals: Vec<f64> = by_month.values().map(|(total, _)| *total).collect();

    by_month
        .into_iter()
        .enumerate()
        .map(|(i, (period, (total, count)))| {
            let lag = |n: usize| i.checked_sub(n).map(|j| totals[j]);
            let rolling3_avg = if i >= 2 {
                Some(totals[i - 2..=i].iter().sum::<f64>() / 3.0)
            } else {
                None
            };

            MonthlyAggregate {
                period,
                total_expense: total,
                transaction_count: count,
                avg_per_transaction: total / f64::from(count),
                lag1: lag(1),
                lag2: lag(2),
                lag3: lag(3),
                rolling3_avg,
            }
        })
        .collect()
}

/// Rows with every feature defined, i.e. the training set
pub fn usable_rows(rows: &[MonthlyAggregate]) -> Vec<MonthlyAggregate> {
    rows.iter().filter(|r| r.is_usable()).cloned().collect()
}

/// Feature vector of a usable row, in `FEATURE_NAMES` order
pub fn feature_vector(row: &MonthlyAggregate) -> Option<[f64; 7]> {
    Some([
        f64::from(row.period.month),
        f64::from(row.transaction_count),
        row.avg_per_transaction,
        row.lag1?,
        row.lag2?,
        row.lag3?,
        row.rolling3_avg?,
    ])
}
