//! Polygon validation, planar area and centroid helpers.

mod area;
mod bounds;

pub use area::{
    m2_to_hectares, planar_area_m2, shoelace_area_deg2, vertex_centroid, METERS_PER_DEGREE,
    SQUARE_METERS_PER_HECTARE,
};
pub use bounds::BoundingBox;

/// Half side, in degrees, of the rectangle built around a single point
pub const POINT_HALF_SPAN_DEG: f64 = 0.05;
