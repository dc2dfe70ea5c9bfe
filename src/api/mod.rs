//! HTTP API: field estimates, market queries and health.

mod field;
mod market;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::earth_engine::{EarthEngineConfig, EarthEngineSession};
use crate::error::EstimateError;
use crate::estimator::Estimator;
use crate::geometry::BoundingBox;
use crate::market::MarketStore;
use crate::profile::RegionProfiles;

/// `{ "error": "..." }` body for every non-2xx response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorBody>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// Application state shared across handlers
pub struct AppState {
    bounds: BoundingBox,
    /// Profile override, bundled tables when unset
    profiles_path: Option<PathBuf>,
    /// Built on first use from the profile tables
    estimator: OnceCell<Estimator>,
    earth_engine_config: EarthEngineConfig,
    /// Built on first use, owned here until shutdown
    earth_engine: OnceCell<EarthEngineSession>,
    market: MarketStore,
}

impl AppState {
    pub fn new(
        bounds: BoundingBox,
        profiles_path: Option<PathBuf>,
        earth_engine_config: EarthEngineConfig,
        market: MarketStore,
    ) -> Self {
        Self {
            bounds,
            profiles_path,
            estimator: OnceCell::new(),
            earth_engine_config,
            earth_engine: OnceCell::new(),
            market,
        }
    }

    /// Session for the estimators. Fails every call while credentials are
    /// missing; nothing is cached on failure.
    pub async fn earth_engine(&self) -> Result<&EarthEngineSession, EstimateError> {
        self.earth_engine
            .get_or_try_init(|| async { EarthEngineSession::init(&self.earth_engine_config) })
            .await
    }

    /// Estimator over the configured profile tables. A missing or invalid
    /// profiles file fails the request and is retried on the next one.
    pub async fn estimator(&self) -> Result<&Estimator, EstimateError> {
        self.estimator
            .get_or_try_init(|| async {
                let profiles = RegionProfiles::load(self.profiles_path.as_deref())
                    .map_err(|e| EstimateError::Runtime(format!("{:#}", e)))?;
                Ok(Estimator::new(self.bounds, profiles))
            })
            .await
    }

    pub fn market(&self) -> &MarketStore {
        &self.market
    }

    /// Release the Earth Engine session if one was opened
    pub fn shutdown(self) {
        if let Some(session) = self.earth_engine.into_inner() {
            session.teardown();
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/crop-data",
            get(field::crop_data_get).post(field::crop_data_post),
        )
        .route("/api/ndvi", get(field::ndvi_get).post(field::ndvi_post))
        .route("/api/market/query", post(market::query_handler))
        .route("/api/market/schema", get(market::schema_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    earth_engine_configured: bool,
    market_store: bool,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ee = &state.earth_engine_config;
    let earth_engine_configured = ee.service_account_email.is_some() && ee.private_key.is_some();
    let market_store = state.market.path().exists();

    Json(HealthResponse {
        status: if earth_engine_configured && market_store {
            "ok"
        } else {
            "degraded"
        },
        earth_engine_configured,
        market_store,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::earth_engine::test_config;
    use crate::market::DEFAULT_ROW_LIMIT;

    pub fn state_with(config: EarthEngineConfig, market: MarketStore) -> Arc<AppState> {
        Arc::new(AppState::new(BoundingBox::INDIA, None, config, market))
    }

    pub fn state_with_profiles(path: impl Into<PathBuf>) -> Arc<AppState> {
        Arc::new(AppState::new(
            BoundingBox::INDIA,
            Some(path.into()),
            test_config(),
            MarketStore::new("/nonexistent/mandi.db", DEFAULT_ROW_LIMIT),
        ))
    }

    pub fn test_state() -> Arc<AppState> {
        state_with(
            test_config(),
            MarketStore::new("/nonexistent/mandi.db", DEFAULT_ROW_LIMIT),
        )
    }

    pub async fn send(
        app: Router,
        request: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_health_reports_missing_store() {
        let (status, body) = send(router(test_state()), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["earth_engine_configured"], true);
        assert_eq!(body["market_store"], false);
    }

    #[tokio::test]
    async fn test_session_is_created_once() {
        let state = test_state();
        let first = state.earth_engine().await.unwrap() as *const EarthEngineSession;
        let second = state.earth_engine().await.unwrap() as *const EarthEngineSession;
        assert_eq!(first, second);

        let state = Arc::try_unwrap(state).ok().unwrap();
        state.shutdown();
    }

    #[tokio::test]
    async fn test_session_error_without_credentials() {
        let state = state_with(
            EarthEngineConfig::default(),
            MarketStore::new("/nonexistent/mandi.db", 10),
        );
        assert!(matches!(
            state.earth_engine().await,
            Err(EstimateError::Config(_))
        ));
        // still failing on the next call
        assert!(state.earth_engine().await.is_err());
    }
}
