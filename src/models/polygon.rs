//! Field polygon types.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Geographic point (lat/lon) in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

// Wire format is a bare `[lat, lon]` pair.
impl Serialize for LatLon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.lat, self.lon].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LatLon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [lat, lon] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Self { lat, lon })
    }
}

/// Ordered ring of field vertices.
///
/// The ring is implicitly closed: the first point may or may not be
/// repeated as the last one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<LatLon>,
}

impl Polygon {
    pub fn new(points: Vec<LatLon>) -> Self {
        Self { points }
    }

    pub fn from_pairs(pairs: &[[f64; 2]]) -> Self {
        Self::new(pairs.iter().map(|[lat, lon]| LatLon::new(*lat, *lon)).collect())
    }

    /// Synthetic closed rectangle of `half_span` degrees around a point.
    ///
    /// Used for requests that only carry a single coordinate.
    pub fn around_point(center: LatLon, half_span: f64) -> Self {
        let LatLon { lat, lon } = center;
        Self::new(vec![
            LatLon::new(lat - half_span, lon - half_span),
            LatLon::new(lat - half_span, lon + half_span),
            LatLon::new(lat + half_span, lon + half_span),
            LatLon::new(lat + half_span, lon - half_span),
            LatLon::new(lat - half_span, lon - half_span),
        ])
    }

    pub fn points(&self) -> &[LatLon] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertices of the ring with a repeated closing point dropped
    pub fn distinct_vertices(&self) -> &[LatLon] {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 && first == last => {
                &self.points[..self.points.len() - 1]
            }
            _ => &self.points,
        }
    }
}
