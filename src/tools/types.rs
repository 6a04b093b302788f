//! Core types for agent-callable tools

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of one tool call.
///
/// Kept structured inside the crate so callers can tell success from
/// failure; flattened to text only where it is handed to the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Payload for the agent (text or JSON)
    Success(Value),
    /// Human-readable reason the agent should read
    Failure(String),
}

impl ToolOutcome {
    pub fn success(payload: impl Into<Value>) -> Self {
        Self::Success(payload.into())
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Flatten for the agent channel: strings pass through, other JSON is
    /// serialized, failures become their reason.
    pub fn into_agent_text(self) -> String {
        match self {
            Self::Success(Value::String(s)) => s,
            Self::Success(other) => other.to_string(),
            Self::Failure(reason) => reason,
        }
    }
}

/// Tool description handed to the agent SDK
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Tool trait - the core abstraction for agent-callable functions
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must be unique within registry)
    fn name(&self) -> &str;

    /// Human-readable description for the agent
    fn description(&self) -> &str;

    /// JSON Schema for tool parameters
    fn parameters(&self) -> Value;

    /// Execute the tool with the agent-supplied arguments
    async fn execute(&self, args: &Value) -> ToolOutcome;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Deserialize tool arguments, turning schema violations into a failure
/// the agent can read.
pub fn parse_args<T: serde::de::DeserializeOwned>(
    tool: &str,
    args: &Value,
) -> std::result::Result<T, ToolOutcome> {
    serde_json::from_value(args.clone())
        .map_err(|e| ToolOutcome::failure(format!("Invalid arguments for {tool}: {e}")))
}
