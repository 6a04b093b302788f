//! The travel agent handed to the realtime transport

use serde_json::Value;

use crate::tools::{ToolDefinition, ToolRegistry};

/// Default display name of the agent
pub const AGENT_NAME: &str = "Assistant";

/// System prompt for the travel assistant, parameterized by the user's plans
pub fn travel_instructions(travel_plans: &str) -> String {
    format!(
        "You are a helpful assistant for the user who is traveling. Default language is English.
User's travel plans: {travel_plans}.
Use the search_nearby_places tool to find nearby places like restaurants, cafes, hotels, and museums.

# UI
Use the update_ui tool to let the user see info in the UI. User can only see the last message.
- IMPORTANT: show information proactively as you are telling about the subject.
- Don't tell about something without displaying it first. Keep messages very short and structured, do not display more than 5 places at a time. Try not to display more than 2 images at a time.
- To show an image referenced by places API, use the following URL format:
  <photo>PLACE_PHOTO_REFERENCE</photo>
"
    )
}

/// Agent definition: name, instructions, and callable tools
pub struct RealtimeAgent {
    name: String,
    instructions: String,
    tools: ToolRegistry,
}

impl RealtimeAgent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools,
        }
    }

    /// Travel assistant bound to `travel_plans`
    pub fn travel(travel_plans: &str, tools: ToolRegistry) -> Self {
        Self::new(AGENT_NAME, travel_instructions(travel_plans), tools)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    /// Run a tool call coming from the realtime transport. The transport
    /// only carries text back to the model, so the outcome is flattened here.
    pub async fn invoke_tool(&self, name: &str, args: &Value) -> String {
        self.tools.execute(name, args).await.into_agent_text()
    }
}

impl std::fmt::Debug for RealtimeAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeAgent")
            .field("name", &self.name)
            .field("tools", &self.tools.list())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::EventBridge;
    use crate::tools::{GetWeatherTool, UpdateUiTool};
    use std::sync::Arc;

    #[test]
    fn test_instructions_embed_plans() {
        let text = travel_instructions("Three days in Milan");
        assert!(text.contains("User's travel plans: Three days in Milan."));
        assert!(text.contains("<photo>PLACE_PHOTO_REFERENCE</photo>"));
        assert!(text.contains("search_nearby_places"));
        assert!(text.contains("update_ui"));
    }

    #[tokio::test]
    async fn test_invoke_tool_flattens() {
        let tools = ToolRegistry::new();
        tools.register(Arc::new(GetWeatherTool));
        tools.register(Arc::new(UpdateUiTool::new(Arc::new(EventBridge::new()))));
        let agent = RealtimeAgent::travel("Rome", tools);

        assert_eq!(agent.name(), "Assistant");
        assert_eq!(
            agent
                .invoke_tool("get_weather", &serde_json::json!({"city": "Rome"}))
                .await,
            "The weather in Rome is sunny."
        );
        assert_eq!(
            agent.invoke_tool("nope", &serde_json::json!({})).await,
            "Unknown tool: nope"
        );
        assert_eq!(agent.tool_definitions().len(), 2);
    }
}
