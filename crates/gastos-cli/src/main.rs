//! Gastos CLI - Personal expense tracker
//!
//! Usage:
//!   gastos init                         Initialize database and default categories
//!   gastos add -d "Uber" -a 25.50       Record an expense (category is inferred)
//!   gastos import --file extrato.csv    Import transactions from CSV
//!   gastos forecast --months 3          Forecast upcoming monthly expenses

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db = &commands::open_db(&cli.db)?;
    let config = &commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(db),
        Commands::Add {
            description,
            amount,
            date,
            kind,
            category,
        } => commands::cmd_add(
            db,
            config,
            &description,
            amount,
            date.as_deref(),
            &kind,
            category.as_deref(),
        ),
        Commands::List { limit, offset } => commands::cmd_list(db, limit, offset),
        Commands::Delete { id } => commands::cmd_delete(db, id),
        Commands::Categorize { id, category, train } => {
            commands::cmd_categorize(db, config, id, &category, train)
        }
        Commands::Categories { action } => match action {
            None | Some(CategoriesAction::List) => commands::cmd_categories_list(db),
            Some(CategoriesAction::Add { name, keywords }) => {
                commands::cmd_categories_add(db, &name, &keywords)
            }
        },
        Commands::Classify { description } => commands::cmd_classify(db, config, &description),
        Commands::Suggest { description, json } => {
            commands::cmd_suggest(db, config, &description, json)
        }
        Commands::Train {
            category,
            description,
        } => commands::cmd_train(db, config, &description, &category),
        Commands::Forecast { months, json } => commands::cmd_forecast(db, config, months, json),
        Commands::Stats { json } => commands::cmd_stats(db, json),
        Commands::Patterns { json } => commands::cmd_patterns(db, json),
        Commands::Import { file } => commands::cmd_import(db, config, &file),
        Commands::Export { output } => commands::cmd_export(db, output.as_deref()),
    }
}
