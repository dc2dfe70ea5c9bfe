//! Load Agmarknet-style CSV exports into the mandi price store.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use indicatif::ProgressBar;
use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::schema::CREATE_TABLE;

/// Counters for one import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub inserted: usize,
    pub skipped: usize,
}

/// Column positions resolved from the CSV header
struct Columns {
    state: usize,
    district: usize,
    market: usize,
    commodity: usize,
    variety: Option<usize>,
    grade: Option<usize>,
    arrival_date: usize,
    min_price: Option<usize>,
    max_price: Option<usize>,
    modal_price: Option<usize>,
}

/// "Min_x0020_Price" / "Min Price" / "min_price" all map to "min_price"
fn normalize_header(h: &str) -> String {
    h.trim()
        .to_lowercase()
        .replace("_x0020_", "_")
        .replace([' ', '-'], "_")
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |name: &str| names.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).with_context(|| format!("Column '{}' not found in CSV header", name))
        };

        Ok(Self {
            state: require("state")?,
            district: require("district")?,
            market: require("market")?,
            commodity: require("commodity")?,
            variety: find("variety"),
            grade: find("grade"),
            arrival_date: require("arrival_date")?,
            min_price: find("min_price"),
            max_price: find("max_price"),
            modal_price: find("modal_price"),
        })
    }
}

/// Agmarknet exports use dd/mm/yyyy; the store keeps ISO dates
fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|v| !v.is_empty())
}

fn price(record: &StringRecord, idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| field(record, i))
        .and_then(|v| v.replace(',', "").parse::<f64>().ok())
}

/// Create the schema if needed and append every valid CSV row.
///
/// Rows missing a required field or with an unreadable date are skipped.
pub fn import_csv<R: Read>(db_path: &Path, input: R, progress: &ProgressBar) -> Result<ImportStats> {
    let mut conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;
    conn.execute_batch(CREATE_TABLE)
        .context("Failed to create mandi schema")?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let columns = Columns::resolve(reader.headers()?)?;

    let mut stats = ImportStats::default();
    let tx = conn.transaction()?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO mandi_prices
                (state, district, market, commodity, variety, grade, arrival_date, min_price, max_price, modal_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;

        for (line, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("Malformed CSV record {}", line + 1))?;
            progress.inc(1);

            let required = (
                field(&record, columns.state),
                field(&record, columns.district),
                field(&record, columns.market),
                field(&record, columns.commodity),
                field(&record, columns.arrival_date).and_then(normalize_date),
            );
            let (Some(state), Some(district), Some(market), Some(commodity), Some(date)) = required
            else {
                debug!("Skipping CSV record {}: missing required field", line + 1);
                stats.skipped += 1;
                continue;
            };

            insert.execute(params![
                state,
                district,
                market,
                commodity,
                columns.variety.and_then(|i| field(&record, i)),
                columns.grade.and_then(|i| field(&record, i)),
                date,
                price(&record, columns.min_price),
                price(&record, columns.max_price),
                price(&record, columns.modal_price),
            ])?;
            stats.inserted += 1;
        }
    }
    tx.commit()?;

    info!(
        "Imported {} rows into {} ({} skipped)",
        stats.inserted,
        db_path.display(),
        stats.skipped
    );
    Ok(stats)
}
