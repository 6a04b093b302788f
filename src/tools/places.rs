use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{parse_args, Tool, ToolOutcome};
use crate::bridge::{EventBridge, UiEvent};
use crate::error::Result;

/// Returned when the search call itself fails
pub const SEARCH_FAILED: &str = "Failed to fetch nearby places.";
/// Returned when the search succeeds without any results
pub const NO_PLACES_FOUND: &str = "No places found.";

/// Search parameters as the agent supplies them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbySearchParams {
    /// "latitude,longitude"
    pub location: String,
    /// Place name, address, or category
    pub keyword: String,
    /// Search radius in meters
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub open_now: bool,
}

fn default_radius() -> f64 {
    1000.0
}

/// Nearby search backend used by the tool (normally the relay client)
#[async_trait]
pub trait PlacesSearch: Send + Sync {
    /// Returns the provider JSON (the relay's `data` field)
    async fn search_nearby_places(&self, params: &NearbySearchParams) -> Result<Value>;
}

pub struct SearchNearbyPlacesTool {
    bridge: Arc<EventBridge>,
    places: Arc<dyn PlacesSearch>,
}

impl SearchNearbyPlacesTool {
    pub fn new(bridge: Arc<EventBridge>, places: Arc<dyn PlacesSearch>) -> Self {
        Self { bridge, places }
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    params: NearbySearchParams,
}

#[async_trait]
impl Tool for SearchNearbyPlacesTool {
    fn name(&self) -> &str {
        "search_nearby_places"
    }

    fn description(&self) -> &str {
        "Search for nearby places based on location, with optional filtering by keywords, \
         distance, rating, and operating hours."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "params": {
                    "type": "object",
                    "description": "Search parameters",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "The point around which to retrieve place information. This must be specified as latitude,longitude."
                        },
                        "keyword": {
                            "type": "string",
                            "description": "This must be a place name, address, or category of establishments like restaurant, cafe, hotel, museum, etc"
                        },
                        "radius": {
                            "type": "number",
                            "default": 1000,
                            "description": "Search radius in meters"
                        },
                        "openNow": {
                            "type": "boolean",
                            "default": false,
                            "description": "Only show places that are currently open"
                        }
                    },
                    "required": ["location", "keyword"]
                }
            },
            "required": ["params"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let SearchArgs { params } = match parse_args(self.name(), args) {
            Ok(a) => a,
            Err(failure) => return failure,
        };

        // Let the UI show progress before the slow call
        self.bridge.publish(&UiEvent::Thinking);
        tracing::info!(?params, "Searching nearby places");

        let data = match self.places.search_nearby_places(&params).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Nearby places search failed: {e}");
                return ToolOutcome::failure(SEARCH_FAILED);
            }
        };

        match data.get("results") {
            Some(Value::Array(results)) if !results.is_empty() => {
                tracing::debug!(count = results.len(), "Received nearby places");
                ToolOutcome::success(Value::Array(results.clone()))
            }
            _ => ToolOutcome::failure(NO_PLACES_FOUND),
        }
    }
}
