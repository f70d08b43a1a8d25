// ABOUTME: Test utilities for playbook-agent, including stub and scripted model clients.
// ABOUTME: Used in tests to simulate Converse responses without real API calls.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, future};
use serde_json::{Value, json};

use playbook_core::{ChatRequest, ChatResponse, InvokeError};

/// Build a minimal end_turn envelope carrying a single text block.
pub fn text_envelope(text: &str) -> Value {
    json!({
        "output": {"message": {"role": "assistant", "content": [{"text": text}]}},
        "stopReason": "end_turn",
        "usage": {"inputTokens": 0, "outputTokens": 0, "totalTokens": 0}
    })
}

/// Build a tool_use envelope requesting a single tool call.
pub fn tool_use_envelope(tool_use_id: &str, name: &str, input: Value) -> Value {
    json!({
        "output": {"message": {"role": "assistant", "content": [
            {"toolUse": {"toolUseId": tool_use_id, "name": name, "input": input}}
        ]}},
        "stopReason": "tool_use"
    })
}

/// A stub model client that returns a pre-configured text response.
///
/// The response contains only a text block, so any agent loop driven by it
/// sees no tool-use requests and terminates after one turn.
#[derive(Debug)]
pub struct StubModelClient {
    response_text: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl StubModelClient {
    /// Create a stub client that always returns the given text.
    pub fn new(response_text: &str) -> Self {
        Self {
            response_text: response_text.to_owned(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a stub client that returns "Done."
    pub fn done() -> Self {
        Self::new("Done.")
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl crate::runtime::ModelClient for StubModelClient {
    async fn converse(&self, request: &ChatRequest) -> Result<ChatResponse, InvokeError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        ChatResponse::from_envelope(text_envelope(&self.response_text))
    }

    fn provider_name(&self) -> &str {
        "stub"
    }
}

/// A model client that replays queued results in order and records requests.
///
/// Once the queue is exhausted every further call returns a
/// MalformedResponse error, which makes runaway loops visible in tests.
#[derive(Debug, Default)]
pub struct ScriptedModelClient {
    script: Mutex<VecDeque<Result<Value, InvokeError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw envelope.
    pub fn then_envelope(self, envelope: Value) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Ok(envelope));
        }
        self
    }

    /// Queue a plain text reply.
    pub fn then_text(self, text: &str) -> Self {
        self.then_envelope(text_envelope(text))
    }

    /// Queue a single tool call.
    pub fn then_tool_use(self, tool_use_id: &str, name: &str, input: Value) -> Self {
        self.then_envelope(tool_use_envelope(tool_use_id, name, input))
    }

    /// Queue a failure.
    pub fn then_error(self, error: InvokeError) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Err(error));
        }
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl crate::runtime::ModelClient for ScriptedModelClient {
    async fn converse(&self, request: &ChatRequest) -> Result<ChatResponse, InvokeError> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Ok(envelope)) => ChatResponse::from_envelope(envelope),
            Some(Err(e)) => Err(e),
            None => Err(InvokeError::MalformedResponse(
                "scripted client has no more responses".to_string(),
            )),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// A credentials provider with nothing to provide, as on a machine with no
/// profile, no access keys and no instance role.
#[derive(Debug, Default)]
pub struct MissingCredentials;

impl ProvideCredentials for MissingCredentials {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::ready(Err(CredentialsError::not_loaded(
            "no profile, access keys or instance role configured",
        )))
    }
}
