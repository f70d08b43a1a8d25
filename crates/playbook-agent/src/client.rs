// ABOUTME: Factory function for creating model clients from resolved configuration.
// ABOUTME: Returns an Arc<dyn ModelClient> so demos never name the concrete adapter.

use std::sync::Arc;

use playbook_core::ClientConfig;

use crate::providers::bedrock::BedrockClient;
use crate::runtime::ModelClient;

/// Create the model client for the given configuration.
///
/// Requests carry the Bedrock API key when one is configured; otherwise they
/// are signed with AWS credentials, taken from the named profile first when
/// there is one. Missing credentials surface on the first request.
pub fn create_model_client(config: &ClientConfig) -> Arc<dyn ModelClient> {
    let client = BedrockClient::from_config(config);
    tracing::info!(
        region = %config.region,
        endpoint = %config.endpoint,
        profile = config.profile.as_deref().unwrap_or("default"),
        auth = client.auth_scheme(),
        "created bedrock client"
    );
    Arc::new(client)
}
