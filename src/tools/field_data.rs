//! Two-step field data tool: `show_map` asks the user to draw a field,
//! `fetch_data` proxies the drawn polygon (or a point) to the estimate API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use super::{Tool, ToolError};
use crate::api::ErrorBody;
use crate::models::Polygon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Crop,
    Ndvi,
}

impl DataType {
    fn path(&self) -> &'static str {
        match self {
            DataType::Crop => "/api/crop-data",
            DataType::Ndvi => "/api/ndvi",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            DataType::Crop => {
                "Draw your field boundary on the map, then confirm to see the crop distribution for that area."
            }
            DataType::Ndvi => {
                "Draw your field boundary on the map, then confirm to see vegetation health (NDVI) for that area."
            }
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FieldDataArgs {
    /// Ask the user to draw the field on the map
    ShowMap { data_type: DataType },
    /// Fetch the estimate. Needs `polygon`, or both `latitude` and `longitude`.
    FetchData {
        data_type: DataType,
        /// Field boundary as [lat, lon] pairs
        #[serde(default)]
        #[schemars(with = "Option<Vec<[f64; 2]>>")]
        polygon: Option<Polygon>,
        #[serde(default)]
        latitude: Option<f64>,
        #[serde(default)]
        longitude: Option<f64>,
        /// YYYY-MM-DD
        #[serde(default)]
        start_date: Option<String>,
        /// YYYY-MM-DD, defaults to today
        #[serde(default)]
        end_date: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldBody<'a> {
    polygon: &'a Polygon,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<&'a str>,
}

pub struct FieldDataTool {
    client: Client,
    base_url: Url,
}

impl FieldDataTool {
    pub fn new(base_url: &str) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent("AgroSense/0.1 (field data tool)")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    fn show_map(data_type: DataType) -> Value {
        json!({
            "action": "show_map",
            "data_type": data_type,
            "message": data_type.instruction(),
        })
    }

    async fn fetch(
        &self,
        data_type: DataType,
        polygon: Option<Polygon>,
        point: Option<(f64, f64)>,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<Value, ToolError> {
        let mut url = self.base_url.join(data_type.path())?;

        let request = match (polygon, point) {
            (Some(polygon), _) => self.client.post(url).json(&FieldBody {
                polygon: &polygon,
                start_date: start_date.as_deref(),
                end_date: end_date.as_deref(),
            }),
            (None, Some((lat, lon))) => {
                {
                    let mut pairs = url.query_pairs_mut();
                    pairs
                        .append_pair("latitude", &lat.to_string())
                        .append_pair("longitude", &lon.to_string());
                    if let Some(start) = &start_date {
                        pairs.append_pair("startDate", start);
                    }
                    if let Some(end) = &end_date {
                        pairs.append_pair("endDate", end);
                    }
                }
                self.client.get(url)
            }
            (None, None) => return Err(ToolError::MissingCoordinates),
        };

        let response = request.send().await?;
        let status = response.status();
        debug!("Field data {:?} answered {}", data_type, status);

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        warn!("Field data request failed ({}): {}", status, message);

        Err(ToolError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Tool for FieldDataTool {
    const NAME: &'static str = "field_data";
    type Args = FieldDataArgs;
    type Output = Value;

    fn description(&self) -> &str {
        "Get crop distribution or vegetation health (NDVI) for a field in India. \
         Call with action \"show_map\" first so the user can draw the field, \
         then with action \"fetch_data\" and the drawn polygon."
    }

    async fn call(&self, args: FieldDataArgs) -> Result<Value, ToolError> {
        match args {
            FieldDataArgs::ShowMap { data_type } => Ok(Self::show_map(data_type)),
            FieldDataArgs::FetchData {
                data_type,
                polygon,
                latitude,
                longitude,
                start_date,
                end_date,
            } => {
                let point = latitude.zip(longitude);
                self.fetch(data_type, polygon, point, start_date, end_date)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::api::test_support::test_state;

    async fn spawn_api() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(test_state())).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_show_map_returns_instruction() {
        let tool = FieldDataTool::new("http://127.0.0.1:9").unwrap();
        let out = tool
            .call_json(r#"{"action": "show_map", "data_type": "ndvi"}"#)
            .await
            .unwrap();
        assert_eq!(out["action"], "show_map");
        assert_eq!(out["data_type"], "ndvi");
        assert!(out["message"].as_str().unwrap().contains("Draw your field"));
    }

    #[test]
    fn test_schema_follows_args() {
        let tool = FieldDataTool::new("http://127.0.0.1:9").unwrap();
        let def = tool.definition();
        assert_eq!(def.name, "field_data");
        assert!(def.parameters.get("$schema").is_none());

        let variants = def.parameters["oneOf"].as_array().unwrap();
        assert_eq!(variants.len(), 2);
        let fetch = variants
            .iter()
            .find(|v| v["properties"]["action"]["enum"][0] == "fetch_data")
            .unwrap();
        assert!(fetch["properties"]["polygon"].is_object());
        assert_eq!(fetch["properties"]["data_type"]["enum"], json!(["crop", "ndvi"]));
        assert!(fetch["description"].as_str().unwrap().contains("latitude"));
    }

    #[tokio::test]
    async fn test_fetch_requires_coordinates() {
        let tool = FieldDataTool::new("http://127.0.0.1:9").unwrap();
        let err = tool
            .call_json(r#"{"action": "fetch_data", "data_type": "crop", "latitude": 28.6}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingCoordinates));
    }

    #[tokio::test]
    async fn test_unknown_action_is_argument_error() {
        let tool = FieldDataTool::new("http://127.0.0.1:9").unwrap();
        let err = tool
            .call_json(r#"{"action": "plot", "data_type": "crop"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Arguments(_)));
    }

    #[tokio::test]
    async fn test_fetch_polygon_through_api() {
        let tool = FieldDataTool::new(&spawn_api().await).unwrap();
        let out = tool
            .call_json(
                r#"{"action": "fetch_data", "data_type": "crop",
                    "polygon": [[28.6, 77.2], [28.7, 77.2], [28.7, 77.3], [28.6, 77.3]]}"#,
            )
            .await
            .unwrap();
        assert_eq!(out["metadata"]["region"], "east");
        assert_eq!(out["crops"][0]["name"], "Rice");
    }

    #[tokio::test]
    async fn test_fetch_point_through_api() {
        let tool = FieldDataTool::new(&spawn_api().await).unwrap();
        let out = tool
            .call_json(
                r#"{"action": "fetch_data", "data_type": "ndvi",
                    "latitude": 29.5, "longitude": 80.9, "end_date": "2024-08-15"}"#,
            )
            .await
            .unwrap();
        assert_eq!(out["metadata"]["region"], "north");
        assert_eq!(out["metadata"]["end_date"], "2024-08-15");
        assert!(out["ndvi"]["mean"].is_number());
    }

    #[tokio::test]
    async fn test_api_rejection_becomes_upstream_error() {
        let tool = FieldDataTool::new(&spawn_api().await).unwrap();
        let err = tool
            .call_json(
                r#"{"action": "fetch_data", "data_type": "crop",
                    "polygon": [[51.5, -0.1], [51.6, -0.1], [51.6, 0.0]]}"#,
            )
            .await
            .unwrap_err();
        match err {
            ToolError::Upstream { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("outside India"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
