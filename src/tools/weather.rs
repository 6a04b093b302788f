use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::types::{parse_args, Tool, ToolOutcome};

/// Placeholder weather lookup with a canned answer.
pub struct GetWeatherTool;

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
}

#[async_trait]
impl Tool for GetWeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Returns the current weather in a given city."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": { "city": { "type": "string" } },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        match parse_args::<WeatherArgs>(self.name(), args) {
            Ok(WeatherArgs { city }) => {
                ToolOutcome::success(format!("The weather in {city} is sunny."))
            }
            Err(failure) => failure,
        }
    }
}
