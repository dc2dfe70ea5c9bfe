//! Core data models for the field estimate service.

pub mod estimate;
pub mod polygon;
pub mod region;

pub use estimate::{
    CropDistribution, CropShare, GeoPoint, HealthStatus, Location, Metadata, NdviEstimate,
    NdviStats,
};
pub use polygon::{LatLon, Polygon};
pub use region::Region;
