//! Weather lookup.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::Tool;
use crate::types::{ToolResult, ToolValue};

/// Retrieve the current weather report for a city.
///
/// Only New York is known; every other city yields an error result naming it.
pub fn get_weather(city: &str) -> ToolResult {
    info!("--- Tool: get_weather called for city: {} ---", city);

    if city.to_lowercase() == "new york" {
        ToolResult::success(
            "The weather in New York is sunny with a temperature of 25 degrees \
             Celsius (77 degrees Fahrenheit).",
        )
    } else {
        ToolResult::error(format!(
            "Weather information for '{}' is not available.",
            city
        ))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CityArgs {
    pub city: String,
}

pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Retrieves the current weather report for a specified city. Returns an object \
         with 'status' ('success' or 'error'), plus 'report' on success or \
         'error_message' on error."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The name of the city for which to retrieve the weather report"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<ToolValue> {
        let args: CityArgs =
            serde_json::from_value(args.clone()).context("Missing or invalid 'city' argument")?;
        Ok(get_weather(&args.city).into())
    }
}
