//! AgroSense - field estimates and mandi prices for Indian agriculture
//!
//! This library provides shared types and modules for the serve, ingest and
//! estimate binaries.

pub mod api;
pub mod config;
pub mod earth_engine;
pub mod error;
pub mod estimator;
pub mod geometry;
pub mod market;
pub mod models;
pub mod profile;
pub mod tools;

pub use config::Config;
pub use error::{EstimateError, ValidationError};
pub use estimator::Estimator;
pub use models::{CropDistribution, LatLon, NdviEstimate, Polygon, Region};
