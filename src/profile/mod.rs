//! Region-keyed crop and vegetation profiles.
//!
//! The tables are data: a bundled TOML file that can be replaced through
//! configuration without touching the estimators.

mod crops;
mod ndvi;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::Region;

pub use crops::{allocate_crops, CropRow};
pub(crate) use crops::round2;
pub use ndvi::{health_percentage, seasonal_offset, NdviBaseline};

const BUNDLED_PROFILES: &str = include_str!("profiles.toml");

/// Allowed drift of a crop table's percentage sum from 100
pub const PERCENTAGE_TOLERANCE: f64 = 0.1;

/// Crop table and NDVI baseline for one region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionProfile {
    pub ndvi: NdviBaseline,
    pub crops: Vec<CropRow>,
}

impl RegionProfile {
    pub fn percentage_sum(&self) -> f64 {
        self.crops.iter().map(|c| c.percentage).sum()
    }
}

/// Profiles for every region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionProfiles {
    pub north: RegionProfile,
    pub south: RegionProfile,
    pub east: RegionProfile,
    pub west: RegionProfile,
    pub central: RegionProfile,
}

impl RegionProfiles {
    /// Profiles shipped with the binary
    pub fn bundled() -> Result<Self> {
        Self::from_toml(BUNDLED_PROFILES).context("Bundled region profiles are invalid")
    }

    /// Tables from `path` when given, the bundled ones otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Self::bundled(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).context("Failed to read profiles file")?;
        let profiles = Self::from_toml(&content)
            .with_context(|| format!("Invalid profiles file {}", path.display()))?;
        info!("Loaded region profiles from {}", path.display());
        Ok(profiles)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let profiles: RegionProfiles =
            toml::from_str(content).context("Failed to parse region profiles")?;
        profiles.validate()?;
        Ok(profiles)
    }

    pub fn get(&self, region: Region) -> &RegionProfile {
        match region {
            Region::North => &self.north,
            Region::South => &self.south,
            Region::East => &self.east,
            Region::West => &self.west,
            Region::Central => &self.central,
        }
    }

    fn validate(&self) -> Result<()> {
        for region in Region::all() {
            let profile = self.get(*region);

            if profile.crops.is_empty() {
                anyhow::bail!("Region '{}' has no crops", region);
            }
            if let Some(row) = profile.crops.iter().find(|c| c.percentage < 0.0) {
                anyhow::bail!("Region '{}' crop '{}' has a negative share", region, row.name);
            }

            let sum = profile.percentage_sum();
            if (sum - 100.0).abs() > PERCENTAGE_TOLERANCE {
                anyhow::bail!("Region '{}' crop shares sum to {:.2}, expected 100", region, sum);
            }

            let NdviBaseline { mean, min, max } = profile.ndvi;
            let in_range = |v: f64| (-1.0..=1.0).contains(&v);
            if !(in_range(min) && in_range(mean) && in_range(max)) || min > mean || mean > max {
                anyhow::bail!(
                    "Region '{}' NDVI baseline must satisfy -1 <= min <= mean <= max <= 1",
                    region
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HealthStatus;

    #[test]
    fn test_bundled_profiles_sum_to_100() {
        let profiles = RegionProfiles::bundled().unwrap();
        for region in Region::all() {
            let sum = profiles.get(*region).percentage_sum();
            assert!((sum - 100.0).abs() <= PERCENTAGE_TOLERANCE, "{}: {}", region, sum);
        }
    }

    #[test]
    fn test_north_wheat_share() {
        let profiles = RegionProfiles::bundled().unwrap();
        let wheat = &profiles.get(Region::North).crops[0];
        assert_eq!(wheat.name, "Wheat");
        assert_eq!(wheat.percentage, 35.2);
        assert_eq!(wheat.season.as_deref(), Some("Rabi"));
    }

    #[test]
    fn test_allocated_areas_sum_to_total() {
        let profiles = RegionProfiles::bundled().unwrap();
        let total_m2 = 123_921_424.0;
        let total_ha = total_m2 / 10_000.0;

        for region in Region::all() {
            let crops = &profiles.get(*region).crops;
            let shares = allocate_crops(crops, total_m2);
            let sum: f64 = shares.iter().map(|s| s.area).sum();
            // each share rounds by at most 0.005 ha
            let slack = total_ha * PERCENTAGE_TOLERANCE / 100.0 + 0.005 * shares.len() as f64;
            assert!((sum - total_ha).abs() <= slack, "{}: {} vs {}", region, sum, total_ha);
        }
    }

    #[test]
    fn test_ndvi_within_range_for_all_months() {
        let profiles = RegionProfiles::bundled().unwrap();
        for region in Region::all() {
            for month in 1..=12 {
                let stats = profiles.get(*region).ndvi.for_month(month);
                assert!((-1.0..=1.0).contains(&stats.mean));
                assert!(stats.min <= stats.mean && stats.mean <= stats.max);
                assert!(stats.std_dev >= 0.0);
                let _ = HealthStatus::from_mean(stats.mean);
                assert!(health_percentage(stats.mean) <= 100);
            }
        }
    }

    #[test]
    fn test_rejects_unbalanced_table() {
        let bad = BUNDLED_PROFILES.replace("percentage = 35.2", "percentage = 45.2");
        let err = RegionProfiles::from_toml(&bad).unwrap_err();
        assert!(err.to_string().contains("north"));
    }

    #[test]
    fn test_rejects_inverted_ndvi_range() {
        let bad = BUNDLED_PROFILES.replace(
            "mean = 0.56, min = 0.30, max = 0.79",
            "mean = 0.56, min = 0.80, max = 0.79",
        );
        assert!(RegionProfiles::from_toml(&bad).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.toml");
        fs::write(&path, BUNDLED_PROFILES).unwrap();
        let profiles = RegionProfiles::load_from_file(&path).unwrap();
        assert_eq!(profiles.get(Region::Central).crops[0].name, "Wheat");
    }
}
