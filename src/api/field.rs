//! Crop distribution and NDVI endpoints.
//!
//! POST takes `{ polygon, startDate?, endDate? }`. GET keeps the older
//! `latitude`/`longitude` form and expands the point into a small rectangle.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::error;

use super::{api_error, ApiError, AppState};
use crate::error::{EstimateError, ValidationError};
use crate::estimator::{DateWindow, FieldQuery};
use crate::models::{CropDistribution, LatLon, NdviEstimate, Polygon};

const CROP_SUBSYSTEM: &str = "Crop data error";
const NDVI_SUBSYSTEM: &str = "NDVI error";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRequest {
    pub polygon: Option<Polygon>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointParams {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Validation failures are 400 with their own message. Configuration
/// errors pass through as-is, anything else gets the subsystem prefix.
fn estimate_error(subsystem: &str, err: EstimateError) -> ApiError {
    match err {
        EstimateError::Validation(e) => api_error(StatusCode::BAD_REQUEST, e.to_string()),
        EstimateError::Config(_) => {
            error!("{}: {}", subsystem, err);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        EstimateError::Runtime(_) => {
            error!("{}: {}", subsystem, err);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}: {}", subsystem, err),
            )
        }
    }
}

fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, message)
}

fn body_query(
    body: Result<Json<FieldRequest>, JsonRejection>,
) -> Result<(FieldQuery, FieldRequest), ApiError> {
    let Json(mut request) = body.map_err(|e| bad_request(e.body_text()))?;
    let polygon = request
        .polygon
        .take()
        .ok_or_else(|| bad_request(ValidationError::MissingField("polygon").to_string()))?;
    Ok((FieldQuery::from_polygon(polygon), request))
}

fn point_query(
    params: Result<Query<PointParams>, QueryRejection>,
) -> Result<(FieldQuery, PointParams), ApiError> {
    let Query(params) = params.map_err(|e| bad_request(e.body_text()))?;
    let lat = params
        .latitude
        .ok_or_else(|| bad_request(ValidationError::MissingField("latitude").to_string()))?;
    let lon = params
        .longitude
        .ok_or_else(|| bad_request(ValidationError::MissingField("longitude").to_string()))?;
    Ok((FieldQuery::from_point(LatLon::new(lat, lon)), params))
}

async fn crop_data(
    state: &AppState,
    query: FieldQuery,
) -> Result<Json<CropDistribution>, ApiError> {
    let session = state
        .earth_engine()
        .await
        .map_err(|e| estimate_error(CROP_SUBSYSTEM, e))?;
    let estimator = state
        .estimator()
        .await
        .map_err(|e| estimate_error(CROP_SUBSYSTEM, e))?;

    estimator
        .crop_distribution(session, &query)
        .map(Json)
        .map_err(|e| estimate_error(CROP_SUBSYSTEM, e))
}

async fn ndvi(
    state: &AppState,
    query: FieldQuery,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Json<NdviEstimate>, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let window = DateWindow::resolve(start, end, today)
        .map_err(|e| estimate_error(NDVI_SUBSYSTEM, e.into()))?;

    let session = state
        .earth_engine()
        .await
        .map_err(|e| estimate_error(NDVI_SUBSYSTEM, e))?;
    let estimator = state
        .estimator()
        .await
        .map_err(|e| estimate_error(NDVI_SUBSYSTEM, e))?;

    estimator
        .ndvi(session, &query, window)
        .map(Json)
        .map_err(|e| estimate_error(NDVI_SUBSYSTEM, e))
}

pub async fn crop_data_post(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FieldRequest>, JsonRejection>,
) -> Result<Json<CropDistribution>, ApiError> {
    let (query, _) = body_query(body)?;
    crop_data(&state, query).await
}

pub async fn crop_data_get(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PointParams>, QueryRejection>,
) -> Result<Json<CropDistribution>, ApiError> {
    let (query, _) = point_query(params)?;
    crop_data(&state, query).await
}

pub async fn ndvi_post(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FieldRequest>, JsonRejection>,
) -> Result<Json<NdviEstimate>, ApiError> {
    let (query, request) = body_query(body)?;
    ndvi(
        &state,
        query,
        request.start_date.as_deref(),
        request.end_date.as_deref(),
    )
    .await
}

pub async fn ndvi_get(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PointParams>, QueryRejection>,
) -> Result<Json<NdviEstimate>, ApiError> {
    let (query, params) = point_query(params)?;
    ndvi(
        &state,
        query,
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::test_support::*;
    use super::super::router;
    use super::*;
    use crate::earth_engine::EarthEngineConfig;
    use crate::market::MarketStore;

    const DELHI: [[f64; 2]; 4] = [[28.6, 77.2], [28.7, 77.2], [28.7, 77.3], [28.6, 77.3]];

    #[tokio::test]
    async fn test_post_crop_data() {
        let (status, body) = send(
            router(test_state()),
            post_json("/api/crop-data", &json!({ "polygon": DELHI })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["region"], "east");
        assert_eq!(body["metadata"]["method"], "static_regional_profile");
        assert_eq!(body["crops"][0]["name"], "Rice");
        assert_eq!(body["location"]["polygon"][0][0], 28.6);
        assert!((body["location"]["center"]["lat"].as_f64().unwrap() - 28.65).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_get_crop_data_from_point() {
        let (status, body) = send(
            router(test_state()),
            get_request("/api/crop-data?latitude=29.5&longitude=80.9"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["region"], "north");
        assert_eq!(body["crops"][0]["name"], "Wheat");
        assert_eq!(body["crops"][0]["percentage"], 35.2);
        assert!(body["location"].get("polygon").is_none());
    }

    #[tokio::test]
    async fn test_too_few_points_is_400() {
        let (status, body) = send(
            router(test_state()),
            post_json("/api/crop-data", &json!({ "polygon": [[28.6, 77.2], [28.7, 77.2]] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("at least 3 points"));
    }

    #[tokio::test]
    async fn test_out_of_bounds_is_400() {
        let (status, body) = send(
            router(test_state()),
            post_json(
                "/api/ndvi",
                &json!({ "polygon": [[28.6, 77.2], [28.7, 77.2], [51.5, -0.12]] }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Point 2"));
    }

    #[tokio::test]
    async fn test_missing_polygon_and_bad_json() {
        let (status, body) = send(
            router(test_state()),
            post_json("/api/crop-data", &json!({ "startDate": "2024-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field: polygon");

        let (status, body) = send(router(test_state()), get_request("/api/ndvi?latitude=20.0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field: longitude");

        let (status, body) = send(
            router(test_state()),
            post_json("/api/crop-data", &json!({ "polygon": "not a polygon" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_post_ndvi_with_dates() {
        let (status, body) = send(
            router(test_state()),
            post_json(
                "/api/ndvi",
                &json!({
                    "polygon": [[23.1, 77.3], [23.3, 77.3], [23.3, 77.5]],
                    "startDate": "2024-09-01",
                    "endDate": "2024-09-30"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["region"], "central");
        // central baseline 0.43 + 0.15
        assert_eq!(body["ndvi"]["mean"], 0.58);
        assert_eq!(body["status"], "good");
        assert_eq!(body["metadata"]["end_date"], "2024-09-30");
    }

    #[tokio::test]
    async fn test_invalid_date_is_400() {
        let (status, body) = send(
            router(test_state()),
            get_request("/api/ndvi?latitude=20.0&longitude=80.0&endDate=30-09-2024"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("30-09-2024"));

        let (status, body) = send(
            router(test_state()),
            post_json(
                "/api/ndvi",
                &json!({ "polygon": DELHI, "endDate": "-262143-01-05" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid date"));
    }

    #[tokio::test]
    async fn test_missing_credentials_is_500() {
        let state = state_with(
            EarthEngineConfig::default(),
            MarketStore::new("/nonexistent/mandi.db", 10),
        );

        let (status, body) = send(
            router(state),
            post_json("/api/crop-data", &json!({ "polygon": DELHI })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Configuration error"));
    }

    #[tokio::test]
    async fn test_bad_profiles_file_is_prefixed_500() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.toml");
        std::fs::write(&path, "[north]\nndvi = { mean = 0.5, min = 0.2, max = 0.7 }\n").unwrap();

        let (status, body) = send(
            router(state_with_profiles(&path)),
            post_json("/api/crop-data", &json!({ "polygon": DELHI })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Crop data error: "), "{}", error);
        assert!(error.contains("Invalid profiles file"));

        let (status, body) = send(
            router(state_with_profiles(dir.path().join("missing.toml"))),
            get_request("/api/ndvi?latitude=20.0&longitude=80.0"),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("NDVI error: "));
    }
}
