//! Tool-calling surface for an LLM orchestrator.
//!
//! Each tool has a name, a description, a JSON schema for its arguments and
//! an async `call`. The orchestrator hands us raw JSON arguments through
//! [`Tool::call_json`] and gets a JSON value back.

mod field_data;
mod market_price;

use async_trait::async_trait;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub use field_data::{DataType, FieldDataArgs, FieldDataTool};
pub use market_price::{MarketPriceArgs, MarketPriceTool};

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    #[error("Either polygon or latitude and longitude are required")]
    MissingCoordinates,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Non-2xx answer from the estimate API, with its `error` message
    #[error("{message} (HTTP {status})")]
    Upstream { status: u16, message: String },

    #[error("Tool task failed: {0}")]
    Task(String),
}

/// Definition handed to the model provider
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    const NAME: &'static str;

    type Args: DeserializeOwned + JsonSchema + Send;

    type Output: Serialize + Send;

    fn description(&self) -> &str;

    /// JSON schema generated from `Args`, with subschemas inlined
    fn parameters(&self) -> serde_json::Value {
        let schema = SchemaSettings::draft07()
            .with(|s| s.inline_subschemas = true)
            .into_generator()
            .into_root_schema_for::<Self::Args>();
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("$schema");
            map.remove("definitions");
        }
        value
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }

    /// Parse raw model arguments, run the tool and serialize its output
    async fn call_json(&self, arguments: &str) -> Result<serde_json::Value, ToolError> {
        let args: Self::Args =
            serde_json::from_str(arguments).map_err(|e| ToolError::Arguments(e.to_string()))?;
        let output = self.call(args).await?;
        serde_json::to_value(output).map_err(|e| ToolError::Arguments(e.to_string()))
    }
}
