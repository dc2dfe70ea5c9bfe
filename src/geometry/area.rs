//! Planar area and centroid of a field polygon.
//!
//! Coordinates are treated as planar degrees and converted with a single
//! meters-per-degree constant on both axes. Good enough for small fields at
//! low latitudes. Self-intersecting rings are not detected; the result is
//! whatever the absolute shoelace sum gives.

use geo::{Area, Coord, LineString};

use crate::models::{LatLon, Polygon};

/// Meters per degree, applied to latitude and longitude alike
pub const METERS_PER_DEGREE: f64 = 111_320.0;

pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Absolute shoelace area in square degrees
pub fn shoelace_area_deg2(polygon: &Polygon) -> f64 {
    let coords: Vec<Coord<f64>> = polygon
        .points()
        .iter()
        .map(|p| Coord { x: p.lat, y: p.lon })
        .collect();

    // geo closes the exterior ring if needed
    geo::Polygon::new(LineString::new(coords), vec![]).unsigned_area()
}

/// Planar area in square meters
pub fn planar_area_m2(polygon: &Polygon) -> f64 {
    shoelace_area_deg2(polygon) * METERS_PER_DEGREE * METERS_PER_DEGREE
}

/// Mean of the ring's vertices (not area weighted).
///
/// A repeated closing vertex is counted once.
pub fn vertex_centroid(polygon: &Polygon) -> Option<LatLon> {
    let vertices = polygon.distinct_vertices();
    if vertices.is_empty() {
        return None;
    }

    let n = vertices.len() as f64;
    let (lat_sum, lon_sum) = vertices
        .iter()
        .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));

    Some(LatLon::new(lat_sum / n, lon_sum / n))
}

pub fn m2_to_hectares(area_m2: f64) -> f64 {
    area_m2 / SQUARE_METERS_PER_HECTARE
}
