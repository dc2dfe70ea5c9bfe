//! One-shot field estimate for a point, printed as JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use agrosense::earth_engine::EarthEngineSession;
use agrosense::estimator::{DateWindow, Estimator, FieldQuery};
use agrosense::{Config, LatLon};

#[derive(Parser, Debug)]
#[command(name = "estimate")]
#[command(about = "Estimate crop distribution or NDVI around a point")]
struct Args {
    /// Latitude in degrees
    #[arg(allow_negative_numbers = true)]
    latitude: f64,

    /// Longitude in degrees
    #[arg(allow_negative_numbers = true)]
    longitude: f64,

    /// Report NDVI instead of crop distribution
    #[arg(long)]
    ndvi: bool,

    /// End of the NDVI window (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end_date: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let estimator = Estimator::new(config.bounds, config.region_profiles()?);
    let session = EarthEngineSession::init(&config.earth_engine)?;

    let query = FieldQuery::from_point(LatLon::new(args.latitude, args.longitude));
    info!("Estimating around ({}, {})", args.latitude, args.longitude);

    let output = if args.ndvi {
        let today = chrono::Utc::now().date_naive();
        let window = DateWindow::resolve(None, args.end_date.as_deref(), today)?;
        serde_json::to_string_pretty(&estimator.ndvi(&session, &query, window)?)?
    } else {
        serde_json::to_string_pretty(&estimator.crop_distribution(&session, &query)?)?
    };

    session.teardown();
    println!("{}", output);

    Ok(())
}
