//! Estimate response documents returned by the crop and NDVI endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{LatLon, Polygon, Region};

/// Center point echo
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<LatLon> for GeoPoint {
    fn from(p: LatLon) -> Self {
        Self { lat: p.lat, lon: p.lon }
    }
}

/// Location echo for a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub center: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,
}

/// Allocated area for one crop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropShare {
    pub name: String,
    /// Hectares, rounded to 2 decimals
    pub area: f64,
    pub percentage: f64,
    pub season: Option<String>,
}

/// Response metadata shared by both estimates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    /// How the numbers were produced (never a satellite product here)
    pub method: String,
    pub region: Region,
    pub area_m2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Crop distribution estimate for a field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropDistribution {
    pub crops: Vec<CropShare>,
    pub total_area_ha: f64,
    pub crop_count: usize,
    pub location: Location,
    pub metadata: Metadata,
}

/// Vegetation health bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Excellent,
    Good,
    Moderate,
    Poor,
    VeryPoor,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Excellent => write!(f, "excellent"),
            HealthStatus::Good => write!(f, "good"),
            HealthStatus::Moderate => write!(f, "moderate"),
            HealthStatus::Poor => write!(f, "poor"),
            HealthStatus::VeryPoor => write!(f, "very_poor"),
        }
    }
}

/// NDVI summary statistics
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NdviStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

/// NDVI estimate for a field and date window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NdviEstimate {
    pub ndvi: NdviStats,
    pub status: HealthStatus,
    /// 0-100
    pub health_percentage: u8,
    pub recommendation: String,
    pub location: Location,
    pub metadata: Metadata,
}
