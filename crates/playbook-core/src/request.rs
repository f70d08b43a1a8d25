// ABOUTME: ChatRequest and ChatResponse, the transient records exchanged with the model endpoint.
// ABOUTME: Responses are decoded leniently from the Converse envelope and keep the raw JSON for logging.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvokeError;
use crate::message::{ContentBlock, Message, Role, ToolUse};

/// A tool the model may call, described by a JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One model invocation: a system prompt, the conversation so far and inference limits.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model_id: String,
    pub system_prompt: String,
    pub messages: Vec<Message>,
    pub max_output_tokens: Option<u32>,
    pub tools: Vec<ToolSpec>,
}

impl ChatRequest {
    /// A single-turn request: one system prompt and one user message.
    pub fn new(
        model_id: impl Into<String>,
        system_prompt: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            system_prompt: system_prompt.into(),
            messages: vec![Message::user_text(user_message)],
            max_output_tokens: None,
            tools: Vec::new(),
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    /// Replace the conversation, e.g. to continue after tool results.
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// The text of the first user turn.
    pub fn user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .and_then(Message::first_text)
    }

    /// Reject requests the endpoint would refuse anyway.
    pub fn validate(&self) -> Result<(), InvokeError> {
        if self.model_id.trim().is_empty() {
            return Err(InvokeError::InvalidRequest("model id is empty".to_string()));
        }
        if self.system_prompt.trim().is_empty() {
            return Err(InvokeError::InvalidRequest(
                "system prompt is empty".to_string(),
            ));
        }
        match self.messages.first() {
            None => Err(InvokeError::InvalidRequest(
                "conversation has no messages".to_string(),
            )),
            Some(first) if first.role != Role::User => Err(InvokeError::InvalidRequest(
                "conversation must start with a user turn".to_string(),
            )),
            Some(first) if first.content.is_empty() => Err(InvokeError::InvalidRequest(
                "user message is empty".to_string(),
            )),
            Some(first) => match first.first_text() {
                Some(text) if text.trim().is_empty() => Err(InvokeError::InvalidRequest(
                    "user message is empty".to_string(),
                )),
                _ => Ok(()),
            },
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    GuardrailIntervened,
    ContentFiltered,
    Other(String),
}

impl StopReason {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "guardrail_intervened" => StopReason::GuardrailIntervened,
            "content_filtered" => StopReason::ContentFiltered,
            other => StopReason::Other(other.to_string()),
        }
    }
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// The decoded reply plus the envelope it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub message: Message,
    pub stop_reason: StopReason,
    pub usage: Usage,
    pub raw_envelope: Value,
}

impl ChatResponse {
    /// Decode a Converse response envelope.
    ///
    /// Only `output.message.content` is required. A missing role defaults to
    /// assistant, a missing stop reason to end_turn, missing usage to zero.
    /// Content blocks of kinds this crate does not model (reasoning, images)
    /// are skipped.
    pub fn from_envelope(envelope: Value) -> Result<Self, InvokeError> {
        let message_value = envelope
            .get("output")
            .and_then(|o| o.get("message"))
            .ok_or_else(|| {
                InvokeError::MalformedResponse("missing output.message in response".to_string())
            })?;

        let blocks = message_value
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                InvokeError::MalformedResponse(
                    "missing output.message.content array in response".to_string(),
                )
            })?;

        let mut content = Vec::with_capacity(blocks.len());
        for block in blocks {
            match serde_json::from_value::<ContentBlock>(block.clone()) {
                Ok(parsed) => content.push(parsed),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unsupported content block");
                }
            }
        }

        let role = match message_value.get("role").and_then(|r| r.as_str()) {
            None | Some("assistant") => Role::Assistant,
            Some("user") => Role::User,
            Some(other) => {
                return Err(InvokeError::MalformedResponse(format!(
                    "unexpected message role: {}",
                    other
                )));
            }
        };

        let stop_reason = envelope
            .get("stopReason")
            .and_then(|s| s.as_str())
            .map(StopReason::from_wire)
            .unwrap_or(StopReason::EndTurn);

        let usage = envelope
            .get("usage")
            .cloned()
            .map(serde_json::from_value::<Usage>)
            .transpose()
            .map_err(|e| InvokeError::MalformedResponse(format!("invalid usage block: {}", e)))?
            .unwrap_or_default();

        Ok(Self {
            message: Message { role, content },
            stop_reason,
            usage,
            raw_envelope: envelope,
        })
    }

    /// The reply text: the first text block of the output message.
    pub fn output_text(&self) -> Result<&str, InvokeError> {
        self.message.first_text().ok_or_else(|| {
            InvokeError::MalformedResponse("response contains no text block".to_string())
        })
    }

    pub fn tool_uses(&self) -> Vec<ToolUse> {
        self.message.tool_uses().cloned().collect()
    }

    pub fn has_tool_use(&self) -> bool {
        self.message.tool_uses().next().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_envelope_extracts_text() {
        let envelope = json!({"output": {"message": {"content": [{"text": "We offer X, Y, Z cards."}]}}});
        let response = ChatResponse::from_envelope(envelope).unwrap();

        assert_eq!(response.output_text().unwrap(), "We offer X, Y, Z cards.");
        assert_eq!(response.message.role, Role::Assistant);
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage, Usage::default());
    }

    #[test]
    fn full_envelope_reads_stop_reason_and_usage() {
        let envelope = json!({
            "output": {"message": {"role": "assistant", "content": [
                {"toolUse": {"toolUseId": "t1", "name": "get_product_info", "input": {"product_type": "phone"}}}
            ]}},
            "stopReason": "tool_use",
            "usage": {"inputTokens": 12, "outputTokens": 7, "totalTokens": 19},
            "metrics": {"latencyMs": 321}
        });
        let response = ChatResponse::from_envelope(envelope).unwrap();

        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.usage.total_tokens, 19);
        assert!(response.has_tool_use());
        assert_eq!(response.tool_uses()[0].name, "get_product_info");
        assert!(response.output_text().is_err());
    }

    #[test]
    fn unknown_blocks_are_skipped() {
        let envelope = json!({"output": {"message": {"role": "assistant", "content": [
            {"reasoningContent": {"reasoningText": {"text": "hmm"}}},
            {"text": "answer"}
        ]}}});
        let response = ChatResponse::from_envelope(envelope).unwrap();
        assert_eq!(response.message.content.len(), 1);
        assert_eq!(response.output_text().unwrap(), "answer");
    }

    #[test]
    fn missing_output_is_malformed() {
        let err = ChatResponse::from_envelope(json!({"message": "Access denied"})).unwrap_err();
        assert!(matches!(err, InvokeError::MalformedResponse(_)));
    }

    #[test]
    fn unknown_stop_reason_is_preserved() {
        assert_eq!(
            StopReason::from_wire("model_context_window_exceeded"),
            StopReason::Other("model_context_window_exceeded".to_string())
        );
        assert_eq!(
            StopReason::from_wire("guardrail_intervened"),
            StopReason::GuardrailIntervened
        );
    }

    #[test]
    fn validate_rejects_empty_prompts() {
        assert!(ChatRequest::new("m", "system", "hi").validate().is_ok());
        assert!(ChatRequest::new("m", "  ", "hi").validate().is_err());
        assert!(ChatRequest::new("m", "system", "").validate().is_err());
        assert!(ChatRequest::new("", "system", "hi").validate().is_err());
        assert!(
            ChatRequest::new("m", "system", "hi")
                .with_messages(Vec::new())
                .validate()
                .is_err()
        );
    }

    #[test]
    fn builder_sets_optional_fields() {
        let req = ChatRequest::new("amazon.nova-pro-v1:0", "sys", "question")
            .with_max_output_tokens(Some(1000))
            .with_tools(vec![ToolSpec {
                name: "t".to_string(),
                description: "d".to_string(),
                input_schema: json!({"type": "object"}),
            }]);

        assert_eq!(req.max_output_tokens, Some(1000));
        assert_eq!(req.tools.len(), 1);
        assert_eq!(req.user_message(), Some("question"));
    }
}
