//! Current-time lookup.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;
use tracing::{info, warn};

use super::weather::CityArgs;
use super::Tool;
use crate::types::{ToolResult, ToolValue};

/// Cities with a known IANA time zone, keyed by lower-case name.
const KNOWN_ZONES: &[(&str, &str)] = &[("new york", "America/New_York")];

fn zone_for(city: &str) -> Option<&'static str> {
    let key = city.to_lowercase();
    KNOWN_ZONES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, zone)| *zone)
}

/// Return the current wall-clock time in a city.
pub fn get_current_time(city: &str) -> ToolResult {
    get_current_time_at(city, Utc::now())
}

/// Same as [`get_current_time`] but for a fixed instant.
pub fn get_current_time_at(city: &str, now: DateTime<Utc>) -> ToolResult {
    info!("--- Tool: get_current_time called for city: {} ---", city);

    let Some(zone) = zone_for(city) else {
        return ToolResult::error(format!(
            "Sorry, I don't have timezone information for {}.",
            city
        ));
    };

    let tz: Tz = match zone.parse() {
        Ok(tz) => tz,
        Err(e) => {
            warn!("Unknown time zone identifier {}: {}", zone, e);
            return ToolResult::error(format!(
                "Sorry, I don't have timezone information for {}.",
                city
            ));
        }
    };

    let local = now.with_timezone(&tz);
    ToolResult::success(format!(
        "The current time in {} is {}",
        city,
        local.format("%Y-%m-%d %H:%M:%S %Z%z")
    ))
}

pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "get_current_time"
    }

    fn description(&self) -> &str {
        "Returns the current time in a specified city. Returns an object with 'status' \
         ('success' or 'error'), plus 'report' on success or 'error_message' on error."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The name of the city for which to retrieve the current time"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: &serde_json::Value) -> Result<ToolValue> {
        let args: CityArgs =
            serde_json::from_value(args.clone()).context("Missing or invalid 'city' argument")?;
        Ok(get_current_time(&args.city).into())
    }
}
