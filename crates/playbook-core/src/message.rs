// ABOUTME: Conversation turns and content blocks in the Bedrock Converse wire shape.
// ABOUTME: Blocks are externally tagged so {"text": ..} and {"toolUse": {..}} map directly onto enum variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUse {
    pub tool_use_id: String,
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

/// Payload of a tool result block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultContent {
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Success,
    Error,
}

/// The answer to a [`ToolUse`], sent back in a user turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub tool_use_id: String,
    pub content: Vec<ToolResultContent>,
    pub status: ToolResultStatus,
}

impl ToolResult {
    /// A successful result carrying a structured JSON document.
    pub fn json(tool_use_id: impl Into<String>, value: Value) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: vec![ToolResultContent::Json(value)],
            status: ToolResultStatus::Success,
        }
    }

    /// A failed result; the message is shown to the model so it can recover.
    pub fn error(tool_use_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            content: vec![ToolResultContent::Text(message.into())],
            status: ToolResultStatus::Error,
        }
    }
}

/// One block of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlock {
    Text(String),
    ToolUse(ToolUse),
    ToolResult(ToolResult),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Wrap tool results in the user turn that must follow a tool_use turn.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: results.into_iter().map(ContentBlock::ToolResult).collect(),
        }
    }

    /// The first text block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }

    /// All text blocks joined by blank lines.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUse> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_text_serializes_to_converse_shape() {
        let msg = Message::user_text("Hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"role": "user", "content": [{"text": "Hello"}]}));
    }

    #[test]
    fn tool_use_block_deserializes_from_wire() {
        let value = json!({
            "role": "assistant",
            "content": [
                {"text": "Let me check."},
                {"toolUse": {"toolUseId": "tu-1", "name": "check_order_status", "input": {"days_since_order": 3}}}
            ]
        });

        let msg: Message = serde_json::from_value(value).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.first_text(), Some("Let me check."));

        let uses: Vec<&ToolUse> = msg.tool_uses().collect();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].tool_use_id, "tu-1");
        assert_eq!(uses[0].name, "check_order_status");
        assert_eq!(uses[0].input["days_since_order"], 3);
    }

    #[test]
    fn tool_results_message_uses_user_role() {
        let msg = Message::tool_results(vec![
            ToolResult::json("tu-1", json!({"status": "Processing"})),
            ToolResult::error("tu-2", "unknown tool"),
        ]);
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["role"], "user");
        assert_eq!(
            value["content"][0],
            json!({"toolResult": {"toolUseId": "tu-1", "content": [{"json": {"status": "Processing"}}], "status": "success"}})
        );
        assert_eq!(value["content"][1]["toolResult"]["status"], "error");
        assert_eq!(
            value["content"][1]["toolResult"]["content"][0]["text"],
            "unknown tool"
        );
    }

    #[test]
    fn joined_text_skips_non_text_blocks() {
        let msg = Message::assistant(vec![
            ContentBlock::text("first"),
            ContentBlock::ToolUse(ToolUse {
                tool_use_id: "tu".to_string(),
                name: "noop".to_string(),
                input: json!({}),
            }),
            ContentBlock::text("second"),
        ]);
        assert_eq!(msg.joined_text(), "first\n\nsecond");
    }
}
