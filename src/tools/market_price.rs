//! Mandi price tool. The model writes a SELECT against the documented
//! schema; the statement runs through the read-only executor.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{Tool, ToolError};
use crate::market::schema::SCHEMA_DESCRIPTION;
use crate::market::{MarketStore, QueryOutcome};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MarketPriceArgs {
    /// A single SQLite SELECT statement
    pub query: String,
}

pub struct MarketPriceTool {
    store: MarketStore,
    description: String,
}

impl MarketPriceTool {
    pub fn new(store: MarketStore) -> Self {
        let description = format!(
            "Look up wholesale crop prices in Indian mandis by running one SQLite SELECT statement.\n{}",
            SCHEMA_DESCRIPTION
        );
        Self { store, description }
    }
}

#[async_trait]
impl Tool for MarketPriceTool {
    const NAME: &'static str = "market_price";
    type Args = MarketPriceArgs;
    type Output = QueryOutcome;

    fn description(&self) -> &str {
        &self.description
    }

    /// Store and policy failures are carried inside the outcome
    async fn call(&self, args: MarketPriceArgs) -> Result<QueryOutcome, ToolError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.execute(&args.query))
            .await
            .map_err(|e| ToolError::Task(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::schema::CREATE_TABLE;
    use crate::market::DEFAULT_ROW_LIMIT;

    #[tokio::test]
    async fn test_definition_carries_schema() {
        let tool = MarketPriceTool::new(MarketStore::new("/nonexistent/mandi.db", 10));
        let def = tool.definition();
        assert_eq!(def.name, "market_price");
        assert!(def.description.contains("modal_price"));
        assert_eq!(def.parameters["required"][0], "query");
        assert_eq!(def.parameters["properties"]["query"]["type"], "string");
    }

    #[tokio::test]
    async fn test_query_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mandi.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(CREATE_TABLE).unwrap();
        conn.execute(
            "INSERT INTO mandi_prices (state, district, market, commodity, arrival_date, modal_price)
             VALUES ('Maharashtra', 'Nashik', 'Lasalgaon', 'Onion', '2024-05-10', 1450.0)",
            [],
        )
        .unwrap();
        drop(conn);

        let tool = MarketPriceTool::new(MarketStore::new(&path, DEFAULT_ROW_LIMIT));
        let out = tool
            .call_json(r#"{"query": "SELECT market FROM mandi_prices WHERE commodity = 'Onion'"}"#)
            .await
            .unwrap();
        assert_eq!(out["success"], true);
        assert_eq!(out["data"][0]["market"], "Lasalgaon");

        let out = tool
            .call_json(r#"{"query": "DELETE FROM mandi_prices"}"#)
            .await
            .unwrap();
        assert_eq!(out["success"], false);
        assert_eq!(out["query"], "DELETE FROM mandi_prices");
    }
}
