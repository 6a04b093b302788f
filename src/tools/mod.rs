//! Agent-callable tools
//!
//! ```text
//! ToolRegistry
//!   ├── update_ui             -> EventBridge (message)
//!   ├── search_nearby_places  -> EventBridge (thinking) + PlacesSearch
//!   └── get_weather           (canned placeholder)
//! ```

mod places;
mod registry;
mod types;
mod update_ui;
mod weather;

use std::sync::Arc;

pub use places::{
    NearbySearchParams, PlacesSearch, SearchNearbyPlacesTool, NO_PLACES_FOUND, SEARCH_FAILED,
};
pub use registry::ToolRegistry;
pub use types::{parse_args, Tool, ToolDefinition, ToolOutcome};
pub use update_ui::UpdateUiTool;
pub use weather::GetWeatherTool;

use crate::bridge::EventBridge;

/// Tools given to the travel agent: nearby search and UI updates.
pub fn travel_tools(bridge: Arc<EventBridge>, places: Arc<dyn PlacesSearch>) -> ToolRegistry {
    let registry = ToolRegistry::new();
    registry.register(Arc::new(SearchNearbyPlacesTool::new(
        Arc::clone(&bridge),
        places,
    )));
    registry.register(Arc::new(UpdateUiTool::new(bridge)));
    registry
}
