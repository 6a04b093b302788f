use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::types::{parse_args, Tool, ToolOutcome};
use crate::bridge::{EventBridge, UiEvent};

/// Shows a markdown message in the UI by publishing it on the bridge.
pub struct UpdateUiTool {
    bridge: Arc<EventBridge>,
}

impl UpdateUiTool {
    pub fn new(bridge: Arc<EventBridge>) -> Self {
        Self { bridge }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateUiArgs {
    markdown: String,
}

#[async_trait]
impl Tool for UpdateUiTool {
    fn name(&self) -> &str {
        "update_ui"
    }

    fn description(&self) -> &str {
        "Shows a message in the user interface. The message is in markdown format. \
         Keep messages nicely formatted and very short - we are showing them on a small screen."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": { "markdown": { "type": "string" } },
            "required": ["markdown"]
        })
    }

    async fn execute(&self, args: &Value) -> ToolOutcome {
        let UpdateUiArgs { markdown } = match parse_args(self.name(), args) {
            Ok(a) => a,
            Err(failure) => return failure,
        };
        let listeners = self.bridge.publish(&UiEvent::Message(markdown));
        tracing::debug!(listeners, "Published UI message");
        ToolOutcome::success("success")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::EventKind;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_publishes_message_once() {
        let bridge = Arc::new(EventBridge::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bridge.subscribe(EventKind::Message, move |e| sink.lock().unwrap().push(e.clone()));

        let tool = UpdateUiTool::new(Arc::clone(&bridge));
        let outcome = tool.execute(&serde_json::json!({"markdown": "**hi**"})).await;

        assert_eq!(outcome, ToolOutcome::success("success"));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![UiEvent::Message("**hi**".to_string())]
        );
    }

    #[tokio::test]
    async fn test_rejects_non_string_markdown() {
        let bridge = Arc::new(EventBridge::new());
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        bridge.subscribe(EventKind::Message, move |_| *sink.lock().unwrap() += 1);

        let tool = UpdateUiTool::new(Arc::clone(&bridge));
        let outcome = tool.execute(&serde_json::json!({"markdown": 5})).await;

        assert!(!outcome.is_success());
        assert_eq!(*seen.lock().unwrap(), 0);
    }
}
