//! Service configuration loaded from TOML.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::earth_engine::EarthEngineConfig;
use crate::geometry::BoundingBox;
use crate::market::DEFAULT_ROW_LIMIT;
use crate::profile::RegionProfiles;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub bounds: BoundingBox,
    pub earth_engine: EarthEngineConfig,
    pub market: MarketConfig,
    /// Optional replacement for the bundled region profiles
    pub profiles: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MarketConfig {
    pub db_path: PathBuf,
    pub row_limit: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/mandi.db"),
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise, then fill
    /// credentials from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_file(p)?,
            None => Self::default(),
        };
        config.earth_engine.merge_env();
        Ok(config)
    }

    pub fn region_profiles(&self) -> Result<RegionProfiles> {
        RegionProfiles::load(self.profiles.as_deref())
    }
}
