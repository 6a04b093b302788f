//! Tool Registry
//!
//! Name-indexed set of tools offered to the agent, with traced execution.

use super::types::{Tool, ToolDefinition, ToolOutcome};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::Instrument;

/// Registry of tools available to an agent
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let mut tools = self.tools.write().unwrap_or_else(|e| e.into_inner());
        tracing::debug!("Registering tool: {}", name);
        if tools.insert(name.clone(), tool).is_some() {
            tracing::warn!("Tool '{}' replaced an existing registration", name);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(|e| e.into_inner());
        tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Tool definitions for the agent, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().unwrap_or_else(|e| e.into_inner());
        let mut defs: Vec<ToolDefinition> = tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// List all registered tool names, sorted
    pub fn list(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: &Value) -> ToolOutcome {
        let span = tracing::info_span!(
            "arriva.tool.execute",
            "arriva.tool.name" = %name,
            "arriva.tool.success" = tracing::field::Empty,
            "arriva.tool.duration_ms" = tracing::field::Empty,
        );
        let start = std::time::Instant::now();

        let outcome = match self.get(name) {
            Some(tool) => tool.execute(args).instrument(span.clone()).await,
            None => ToolOutcome::failure(format!("Unknown tool: {name}")),
        };

        span.record("arriva.tool.success", outcome.is_success());
        span.record("arriva.tool.duration_ms", start.elapsed().as_millis() as u64);
        span.in_scope(|| tracing::debug!(success = outcome.is_success(), "Tool finished"));
        outcome
    }
}
