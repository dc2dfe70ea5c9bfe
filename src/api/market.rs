//! Market price SQL pass-through.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::{api_error, ApiError, AppState};
use crate::market::schema::{SCHEMA_DESCRIPTION, TABLE_NAME};
use crate::market::QueryOutcome;

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    pub query: String,
}

#[derive(Serialize)]
pub struct SchemaResponse {
    table: &'static str,
    schema: &'static str,
    row_limit: usize,
}

/// Run a SELECT against the mandi store. Query failures come back as a
/// 200 with `success: false`.
pub async fn query_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<MarketQuery>, JsonRejection>,
) -> Result<Json<QueryOutcome>, ApiError> {
    let Json(request) = body.map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()))?;

    let store = state.market().clone();
    let outcome = tokio::task::spawn_blocking(move || store.execute(&request.query))
        .await
        .map_err(|e| {
            error!("Market query task failed: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Market query error: {}", e),
            )
        })?;

    Ok(Json(outcome))
}

pub async fn schema_handler(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    Json(SchemaResponse {
        table: TABLE_NAME,
        schema: SCHEMA_DESCRIPTION,
        row_limit: state.market().row_limit(),
    })
}
