//! Crop distribution and NDVI estimators.
//!
//! Both run the same pipeline: validate the polygon, take its planar area
//! and vertex centroid, classify the region, then read the region profile.
//! The numbers are static regional approximations, and the response
//! metadata says so.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::earth_engine::EarthEngineSession;
use crate::error::{EstimateError, ValidationError};
use crate::geometry::{
    m2_to_hectares, planar_area_m2, vertex_centroid, BoundingBox, POINT_HALF_SPAN_DEG,
};
use crate::models::{
    CropDistribution, HealthStatus, LatLon, Location, Metadata, NdviEstimate, Polygon, Region,
};
use crate::profile::{allocate_crops, health_percentage, round2, RegionProfiles};

pub const CROP_SOURCE: &str = "AgroSense regional crop profile (static estimate)";
pub const NDVI_SOURCE: &str = "AgroSense regional NDVI profile (static estimate)";
pub const ESTIMATE_METHOD: &str = "static_regional_profile";

/// Default NDVI look-back when no start date is given
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// The field an estimate is requested for
#[derive(Debug, Clone)]
pub struct FieldQuery {
    pub polygon: Polygon,
    /// Whether the caller sent a polygon that should be echoed back
    pub echo_polygon: bool,
}

impl FieldQuery {
    pub fn from_polygon(polygon: Polygon) -> Self {
        Self {
            polygon,
            echo_polygon: true,
        }
    }

    /// Single coordinate, expanded into a small rectangle
    pub fn from_point(center: LatLon) -> Self {
        Self {
            polygon: Polygon::around_point(center, POINT_HALF_SPAN_DEG),
            echo_polygon: false,
        }
    }
}

/// Inclusive date range of an NDVI query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Parse optional `YYYY-MM-DD` bounds. End defaults to `today`, start to
    /// thirty days before the end.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let end = match end {
            Some(s) => parse_date(s)?,
            None => today,
        };
        let start = match start {
            Some(s) => parse_date(s)?,
            None => end
                .checked_sub_signed(Duration::days(DEFAULT_WINDOW_DAYS))
                .ok_or_else(|| ValidationError::InvalidDate(end.to_string()))?,
        };

        if start > end {
            return Err(ValidationError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self { start, end })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Shared geometry of a validated field
struct FieldSummary {
    area_m2: f64,
    center: LatLon,
    region: Region,
}

/// Region-profile estimator
pub struct Estimator {
    bounds: BoundingBox,
    profiles: RegionProfiles,
}

impl Estimator {
    pub fn new(bounds: BoundingBox, profiles: RegionProfiles) -> Self {
        Self { bounds, profiles }
    }

    fn summarize(&self, polygon: &Polygon) -> Result<FieldSummary, ValidationError> {
        self.bounds.validate(polygon.points())?;

        let center = vertex_centroid(polygon).ok_or(ValidationError::MissingField("polygon"))?;
        let area_m2 = planar_area_m2(polygon);
        let region = Region::classify(center.lat, center.lon);

        Ok(FieldSummary {
            area_m2,
            center,
            region,
        })
    }

    fn location(query: &FieldQuery, center: LatLon) -> Location {
        Location {
            center: center.into(),
            polygon: query.echo_polygon.then(|| query.polygon.clone()),
        }
    }

    /// Crop distribution for a field
    pub fn crop_distribution(
        &self,
        session: &EarthEngineSession,
        query: &FieldQuery,
    ) -> Result<CropDistribution, EstimateError> {
        let field = self.summarize(&query.polygon)?;
        let profile = self.profiles.get(field.region);

        debug!(
            "Crop estimate for {}-point field ({:.0} m2, region {}) as {} in project {}",
            query.polygon.len(),
            field.area_m2,
            field.region,
            session.service_account(),
            session.project_id().unwrap_or("-")
        );

        let crops = allocate_crops(&profile.crops, field.area_m2);

        Ok(CropDistribution {
            total_area_ha: round2(m2_to_hectares(field.area_m2)),
            crop_count: crops.len(),
            crops,
            location: Self::location(query, field.center),
            metadata: Metadata {
                source: CROP_SOURCE.to_string(),
                method: ESTIMATE_METHOD.to_string(),
                region: field.region,
                area_m2: field.area_m2,
                start_date: None,
                end_date: None,
            },
        })
    }

    /// NDVI statistics for a field over a date window.
    ///
    /// The seasonal adjustment is keyed on the month of the window's end.
    pub fn ndvi(
        &self,
        session: &EarthEngineSession,
        query: &FieldQuery,
        window: DateWindow,
    ) -> Result<NdviEstimate, EstimateError> {
        let field = self.summarize(&query.polygon)?;
        let stats = self
            .profiles
            .get(field.region)
            .ndvi
            .for_month(window.end.month());

        debug!(
            "NDVI estimate for region {} ending {} as {} in project {}",
            field.region,
            window.end,
            session.service_account(),
            session.project_id().unwrap_or("-")
        );

        let status = HealthStatus::from_mean(stats.mean);

        Ok(NdviEstimate {
            ndvi: stats,
            status,
            health_percentage: health_percentage(stats.mean),
            recommendation: status.recommendation().to_string(),
            location: Self::location(query, field.center),
            metadata: Metadata {
                source: NDVI_SOURCE.to_string(),
                method: ESTIMATE_METHOD.to_string(),
                region: field.region,
                area_m2: field.area_m2,
                start_date: Some(window.start),
                end_date: Some(window.end),
            },
        })
    }
}
