use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use ledgerline_data::ScheduleLoader;
use ledgerline_db_sqlite::SqliteNexusRepository;

/// Validate a bracket schedule CSV and optionally prepare the nexus database.
///
/// The CSV file should have the following columns:
/// - tax_year: The tax year (e.g., 2024)
/// - filing_status: single, married_joint, married_separate, or head_of_household
/// - bracket_min: The lower income bound for this bracket
/// - bracket_max: The upper income bound (empty for unlimited)
/// - rate: The marginal rate as a decimal (e.g., 0.10)
/// - base_tax: The tax owed on all income below bracket_min
#[derive(Parser, Debug)]
#[command(name = "ledgerline-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing bracket schedules
    #[arg(short, long)]
    file: PathBuf,

    /// Tax year to build rate tables for
    #[arg(short, long, default_value_t = 2024)]
    tax_year: i32,

    /// SQLite database URL for the nexus store (e.g., sqlite:nexus.db?mode=rwc
    /// to create if missing); migrations run before the loader exits
    #[arg(short, long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    println!("Loading bracket schedules from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = ScheduleLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let tables = ScheduleLoader::build_rate_tables(&records, args.tax_year)
        .with_context(|| format!("Invalid bracket schedules for tax year {}", args.tax_year))?;

    let mut statuses: Vec<_> = tables.keys().copied().collect();
    statuses.sort_by_key(|status| status.as_str());
    for status in statuses {
        let brackets = tables[&status].brackets();
        let top_rate = brackets.last().map(|b| b.rate).unwrap_or_default();
        println!(
            "  {}: {} brackets, top rate {}",
            status,
            brackets.len(),
            top_rate
        );
    }

    if let Some(database) = &args.database {
        let repo = SqliteNexusRepository::new(database)
            .await
            .with_context(|| format!("Failed to connect to database: {database}"))?;
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Nexus database ready at: {database}");
    }

    Ok(())
}
