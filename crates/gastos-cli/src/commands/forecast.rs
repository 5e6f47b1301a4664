//! Forecast command implementation

use anyhow::Result;
use gastos_core::{Database, EngineConfig, Forecaster};

use super::format_brl;

pub fn cmd_forecast(db: &Database, config: &EngineConfig, months: usize, json: bool) -> Result<()> {
    let forecaster = Forecaster::with_config(config.forecast.clone());

    let results = match forecaster.forecast_multiple_from_store(db, months.max(1)) {
        Ok(results) => results,
        Err(e) if e.is_insufficient_data() => {
            println!("📉 Need more history to forecast.");
            println!("   {}", e);
            println!("   Keep recording expenses; a few more months are needed.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!();
    println!("🔮 Expense Forecast");
    println!("   ─────────────────────────────────────────────────────────────");
    for r in &results {
        println!(
            "   {} │ {:>14} │ {} - {} │ confidence {:.0}%",
            r.target_period,
            format_brl(r.estimate),
            format_brl(r.lower_bound),
            format_brl(r.upper_bound),
            r.confidence * 100.0
        );
    }

    if let Some(diagnostics) = forecaster.diagnostics() {
        println!();
        print!(
            "   Model fitted on {} months",
            diagnostics.training_rows
        );
        match (diagnostics.mae, diagnostics.rmse) {
            (Some(mae), Some(rmse)) => println!(
                " (hold-out {}: MAE {}, RMSE {})",
                diagnostics.holdout_rows,
                format_brl(mae),
                format_brl(rmse)
            ),
            _ => println!(),
        }
    }

    Ok(())
}
