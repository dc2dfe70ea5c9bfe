//! Mandi price ingest tool.
//!
//! Loads Agmarknet CSV exports into the local SQLite store read by the
//! market price endpoint.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use agrosense::market::{import_csv, ImportStats};
use agrosense::Config;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Import mandi price CSV files into the market store")]
struct Args {
    /// CSV files to import
    #[arg(short, long, required = true)]
    file: Vec<PathBuf>,

    /// SQLite store, defaults to the path in the config file
    #[arg(long)]
    db: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let db_path = args.db.unwrap_or(config.market.db_path);

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    info!("Importing into {}", db_path.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} rows ({per_sec}) {msg}")?,
    );

    let mut total = ImportStats::default();
    for path in &args.file {
        pb.set_message(path.display().to_string());
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let stats = import_csv(&db_path, BufReader::new(file), &pb)?;
        total.inserted += stats.inserted;
        total.skipped += stats.skipped;
    }

    pb.finish_with_message("done");
    info!(
        "Import complete: {} rows inserted, {} skipped",
        total.inserted, total.skipped
    );

    Ok(())
}
