//! Bounding box validation for incoming field polygons.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::LatLon;

/// Axis-aligned rectangle, inclusive on every edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Loose rectangle around India. Not a border.
    pub const INDIA: BoundingBox = BoundingBox {
        min_lat: 6.5,
        max_lat: 35.5,
        min_lon: 68.0,
        max_lon: 97.5,
    };

    pub fn contains(&self, point: LatLon) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lon >= self.min_lon
            && point.lon <= self.max_lon
    }

    /// Check point count first, then every point in order.
    pub fn validate(&self, points: &[LatLon]) -> Result<(), ValidationError> {
        if points.len() < 3 {
            return Err(ValidationError::InsufficientPoints(points.len()));
        }

        match points.iter().position(|p| !self.contains(*p)) {
            Some(index) => Err(ValidationError::OutOfBounds {
                index,
                lat: points[index].lat,
                lon: points[index].lon,
            }),
            None => Ok(()),
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::INDIA
    }
}
