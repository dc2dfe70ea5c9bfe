//! HTTP server for field estimates and mandi price queries.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use agrosense::api::{router, AppState};
use agrosense::market::MarketStore;
use agrosense::Config;

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "AgroSense field estimate and market price server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    info!("AgroSense server");

    if let Err(e) = config.region_profiles() {
        warn!("Region profiles unavailable ({:#}); estimate endpoints will fail", e);
    }

    if config.earth_engine.service_account_email.is_none() {
        warn!("Earth Engine credentials are not set; estimate endpoints will fail");
    }

    let market = MarketStore::new(&config.market.db_path, config.market.row_limit);
    if !market.path().exists() {
        warn!(
            "Mandi store {} does not exist; run ingest first",
            market.path().display()
        );
    }

    let state = Arc::new(AppState::new(
        config.bounds,
        config.profiles.clone(),
        config.earth_engine.clone(),
        market,
    ));
    let app = router(state.clone());

    let listen = args.listen.unwrap_or(config.server.listen);
    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await?;

    match Arc::try_unwrap(state) {
        Ok(state) => state.shutdown(),
        Err(_) => warn!("Application state still shared at shutdown"),
    }

    Ok(())
}
