// ABOUTME: Defines the ModelClient trait that every model endpoint adapter implements.
// ABOUTME: One call in, one decoded response out; retries and streaming are deliberately absent.

use async_trait::async_trait;

use playbook_core::{ChatRequest, ChatResponse, InvokeError};

/// Trait that all model endpoint adapters must implement. Each adapter
/// translates a ChatRequest into its API's wire format and decodes the
/// reply into a ChatResponse.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one request and wait for the complete response.
    async fn converse(&self, request: &ChatRequest) -> Result<ChatResponse, InvokeError>;

    /// Provider name for logging and display (e.g. "bedrock").
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubModelClient;
    use std::sync::Arc;

    #[tokio::test]
    async fn trait_objects_are_usable_behind_arc() {
        let client: Arc<dyn ModelClient> = Arc::new(StubModelClient::new("pong"));
        let response = client
            .converse(&ChatRequest::new("stub-model", "system", "ping"))
            .await
            .unwrap();

        assert_eq!(response.output_text().unwrap(), "pong");
        assert_eq!(client.provider_name(), "stub");
    }
}
