// ABOUTME: Single-turn chat invoker: one system prompt and one user message in, reply text out.
// ABOUTME: Shared by the guardrail and reasoning-comparison demos.

use std::sync::Arc;

use playbook_core::{ChatRequest, ChatResponse, InvokeError};

use crate::runtime::ModelClient;

/// Binds a model client to a model id and an optional output-token cap.
#[derive(Clone)]
pub struct ChatInvoker {
    client: Arc<dyn ModelClient>,
    model_id: String,
    max_output_tokens: Option<u32>,
}

impl ChatInvoker {
    pub fn new(client: Arc<dyn ModelClient>, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            max_output_tokens: None,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Send one request and return the full decoded response.
    pub async fn invoke(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<ChatResponse, InvokeError> {
        let request = ChatRequest::new(self.model_id.as_str(), system_prompt, user_message)
            .with_max_output_tokens(self.max_output_tokens);
        request.validate()?;
        self.client.converse(&request).await
    }

    /// Send one request and return only the reply text.
    pub async fn ask(&self, system_prompt: &str, user_message: &str) -> Result<String, InvokeError> {
        let response = self.invoke(system_prompt, user_message).await?;
        response.output_text().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedModelClient, StubModelClient};
    use serde_json::json;

    #[tokio::test]
    async fn ask_returns_exact_reply_text() {
        let stub = Arc::new(StubModelClient::new("We offer X, Y, Z cards."));
        let invoker = ChatInvoker::new(stub.clone(), "anthropic.claude-3-haiku-20240307-v1:0");

        let reply = invoker
            .ask("You are a support agent.", "Hi, what are the credit cards available")
            .await
            .unwrap();

        assert_eq!(reply, "We offer X, Y, Z cards.");

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system_prompt, "You are a support agent.");
        assert_eq!(
            requests[0].user_message(),
            Some("Hi, what are the credit cards available")
        );
        assert_eq!(requests[0].max_output_tokens, None);
    }

    #[tokio::test]
    async fn max_tokens_is_passed_through() {
        let stub = Arc::new(StubModelClient::done());
        let invoker = ChatInvoker::new(stub.clone(), "amazon.nova-pro-v1:0").with_max_output_tokens(1000);

        invoker.ask("system", "question").await.unwrap();

        assert_eq!(stub.requests()[0].max_output_tokens, Some(1000));
        assert_eq!(stub.requests()[0].model_id, "amazon.nova-pro-v1:0");
    }

    #[tokio::test]
    async fn empty_prompt_fails_without_calling_client() {
        let stub = Arc::new(StubModelClient::done());
        let invoker = ChatInvoker::new(stub.clone(), "m");

        let err = invoker.ask("", "question").await.unwrap_err();

        assert!(matches!(err, InvokeError::InvalidRequest(_)));
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn reply_without_text_is_malformed() {
        let scripted = Arc::new(ScriptedModelClient::new().then_envelope(
            json!({"output": {"message": {"role": "assistant", "content": []}}}),
        ));
        let invoker = ChatInvoker::new(scripted, "m");

        let err = invoker.ask("system", "question").await.unwrap_err();
        assert!(matches!(err, InvokeError::MalformedResponse(_)));
    }
}
