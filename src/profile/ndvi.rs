//! NDVI baselines, seasonal adjustment and health buckets.

use serde::{Deserialize, Serialize};

use crate::models::{HealthStatus, NdviStats};

/// Regional NDVI baseline before the seasonal adjustment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NdviBaseline {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Offset added to every NDVI value for the calendar month (1-12)
pub fn seasonal_offset(month: u32) -> f64 {
    match month {
        7..=10 => 0.15,
        11 | 12 => 0.10,
        4..=6 => -0.10,
        _ => 0.0,
    }
}

impl NdviBaseline {
    /// Apply the month offset, clamp to [-1, 1] and derive the spread.
    pub fn for_month(&self, month: u32) -> NdviStats {
        let offset = seasonal_offset(month);
        let adjust = |v: f64| round3((v + offset).clamp(-1.0, 1.0));

        let mean = adjust(self.mean);
        let min = adjust(self.min);
        let max = adjust(self.max);

        NdviStats {
            mean,
            min,
            max,
            std_dev: round3((max - min) / 4.0),
        }
    }
}

impl HealthStatus {
    /// Bucket for a mean NDVI value. Lower bounds are inclusive.
    pub fn from_mean(mean: f64) -> Self {
        if mean >= 0.6 {
            HealthStatus::Excellent
        } else if mean >= 0.4 {
            HealthStatus::Good
        } else if mean >= 0.2 {
            HealthStatus::Moderate
        } else if mean >= 0.0 {
            HealthStatus::Poor
        } else {
            HealthStatus::VeryPoor
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            HealthStatus::Excellent => {
                "Vegetation is dense and healthy. Maintain current irrigation and nutrient schedule."
            }
            HealthStatus::Good => {
                "Vegetation is healthy. Keep monitoring for pests and plan the next fertilizer dose."
            }
            HealthStatus::Moderate => {
                "Vegetation is moderate. Check soil moisture and consider a nitrogen top dressing."
            }
            HealthStatus::Poor => {
                "Vegetation is sparse. Inspect the field for water stress, pests or nutrient deficiency."
            }
            HealthStatus::VeryPoor => {
                "Little or no vegetation detected. The field may be fallow, flooded or recently harvested."
            }
        }
    }
}

/// 0-100 health score, linear inside each bucket
pub fn health_percentage(mean: f64) -> u8 {
    let pct = match HealthStatus::from_mean(mean) {
        HealthStatus::Excellent => 80.0 + (mean - 0.6) / 0.4 * 20.0,
        HealthStatus::Good => 60.0 + (mean - 0.4) / 0.2 * 20.0,
        HealthStatus::Moderate => 40.0 + (mean - 0.2) / 0.2 * 20.0,
        HealthStatus::Poor => 20.0 + mean / 0.2 * 20.0,
        HealthStatus::VeryPoor => (mean + 1.0) * 20.0,
    };
    pct.clamp(0.0, 100.0).round() as u8
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}
