//! Import and export command implementations

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use gastos_core::{import_csv, Classifier, Database, EngineConfig};

pub fn cmd_import(db: &Database, config: &EngineConfig, file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let classifier = Classifier::with_config(db, config.clone());
    let result = import_csv(db, &classifier, reader).context("Import failed")?;

    println!("✅ Import complete");
    println!("   Imported:        {}", result.imported);
    println!("   Auto-classified: {}", result.auto_classified);
    if result.duplicates > 0 {
        println!("   Duplicates:      {} (already imported)", result.duplicates);
    }
    if result.skipped > 0 {
        println!("   ⚠️  Skipped:      {} (unreadable rows)", result.skipped);
    }

    Ok(())
}

pub fn cmd_export(db: &Database, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let count = db.export_transactions_csv(BufWriter::new(file))?;
            println!("📤 Exported {} transactions to {}", count, path.display());
        }
        None => {
            db.export_transactions_csv(io::stdout().lock())?;
        }
    }

    Ok(())
}
