//! Crop table rows and area allocation.

use serde::{Deserialize, Serialize};

use crate::geometry::m2_to_hectares;
use crate::models::CropShare;

/// One row of a regional crop table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRow {
    pub name: String,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

/// Split `total_area_m2` across the table rows, in table order.
///
/// Each share is `total * pct / 100` converted to hectares and rounded to
/// two decimals.
pub fn allocate_crops(rows: &[CropRow], total_area_m2: f64) -> Vec<CropShare> {
    rows.iter()
        .map(|row| CropShare {
            name: row.name.clone(),
            area: round2(m2_to_hectares(total_area_m2 * row.percentage / 100.0)),
            percentage: row.percentage,
            season: row.season.clone(),
        })
        .collect()
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
