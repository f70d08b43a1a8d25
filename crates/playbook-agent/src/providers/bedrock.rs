// ABOUTME: Amazon Bedrock Converse API adapter implementing the ModelClient trait.
// ABOUTME: Authenticates with a Bedrock API key or SigV4-signed AWS credentials and maps HTTP failures onto InvokeError.

use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{SignableBody, SignableRequest, SigningSettings, sign};
use aws_sigv4::sign::v4;
use serde_json::{Value, json};

use playbook_core::{ChatRequest, ChatResponse, ClientConfig, CredentialSource, InvokeError};

use crate::runtime::ModelClient;

/// SigV4 signing name of the Bedrock runtime.
const SIGNING_NAME: &str = "bedrock";

enum Auth {
    ApiKey(String),
    SigV4(SharedCredentialsProvider),
}

/// Bedrock runtime adapter. Calls `POST {endpoint}/model/{modelId}/converse`,
/// authenticated with a bearer API key or SigV4.
pub struct BedrockClient {
    client: reqwest::Client,
    endpoint: String,
    auth: Auth,
    region: String,
}

/// Credential chain for signed requests. A named profile is tried before
/// access keys in the environment; without one the environment goes first.
fn credential_chain(profile: Option<&str>) -> SharedCredentialsProvider {
    let mut profile_provider = ProfileFileCredentialsProvider::builder();
    if let Some(name) = profile {
        profile_provider = profile_provider.profile_name(name);
    }
    let profile_provider = profile_provider.build();
    let environment = EnvironmentVariableCredentialsProvider::new();

    let chain = match profile {
        Some(_) => CredentialsProviderChain::first_try("Profile", profile_provider)
            .or_else("Environment", environment),
        None => CredentialsProviderChain::first_try("Environment", environment)
            .or_else("Profile", profile_provider),
    };
    SharedCredentialsProvider::new(chain)
}

impl BedrockClient {
    /// Create a client from resolved configuration: the API key when one was
    /// resolved, otherwise SigV4 with the profile-aware credential chain.
    pub fn from_config(config: &ClientConfig) -> Self {
        let endpoint = config.endpoint.clone();
        let region = config.region.clone();
        match config.credential_source() {
            CredentialSource::ApiKey(api_key) => Self::new(api_key.to_string(), endpoint, region),
            CredentialSource::Profile(name) => {
                Self::with_provider(credential_chain(Some(name)), endpoint, region)
            }
            CredentialSource::DefaultChain => {
                Self::with_provider(credential_chain(None), endpoint, region)
            }
        }
    }

    /// Create a client authenticated with a Bedrock API key.
    pub fn new(api_key: String, endpoint: String, region: String) -> Self {
        Self::with_auth(Auth::ApiKey(api_key), endpoint, region)
    }

    /// Create a client that signs requests with credentials from `provider`.
    pub fn with_credentials(
        provider: impl ProvideCredentials + 'static,
        endpoint: String,
        region: String,
    ) -> Self {
        Self::with_provider(SharedCredentialsProvider::new(provider), endpoint, region)
    }

    fn with_provider(provider: SharedCredentialsProvider, endpoint: String, region: String) -> Self {
        Self::with_auth(Auth::SigV4(provider), endpoint, region)
    }

    fn with_auth(auth: Auth, endpoint: String, region: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth,
            region,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Name of the authentication scheme, for logs.
    pub fn auth_scheme(&self) -> &'static str {
        match self.auth {
            Auth::ApiKey(_) => "api-key",
            Auth::SigV4(_) => "sigv4",
        }
    }

    /// SigV4 headers for a POST of `payload` to `url`.
    async fn sigv4_headers(
        &self,
        provider: &SharedCredentialsProvider,
        url: &reqwest::Url,
        payload: &[u8],
    ) -> Result<Vec<(String, String)>, InvokeError> {
        let credentials = provider
            .provide_credentials()
            .await
            .map_err(|e| InvokeError::Credentials(format!("no AWS credentials found: {}", e)))?;
        let identity = credentials.into();

        let params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SIGNING_NAME)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| InvokeError::Credentials(format!("invalid signing parameters: {}", e)))?
            .into();

        let signable = SignableRequest::new(
            "POST",
            url.as_str(),
            [("content-type", "application/json")].into_iter(),
            SignableBody::Bytes(payload),
        )
        .map_err(|e| InvokeError::InvalidRequest(format!("request cannot be signed: {}", e)))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| InvokeError::Credentials(format!("signing failed: {}", e)))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }

    /// The Converse URL for a model. The model id is a single path segment.
    pub fn converse_url(&self, model_id: &str) -> Result<reqwest::Url, InvokeError> {
        let mut url = reqwest::Url::parse(&self.endpoint).map_err(|e| {
            InvokeError::InvalidRequest(format!("invalid endpoint {}: {}", self.endpoint, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                InvokeError::InvalidRequest(format!(
                    "endpoint cannot carry a path: {}",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(["model", model_id, "converse"]);
        Ok(url)
    }

    /// Build the JSON request body for the Converse API.
    pub fn build_request_body(request: &ChatRequest) -> Result<Value, InvokeError> {
        let messages = serde_json::to_value(&request.messages).map_err(|e| {
            InvokeError::InvalidRequest(format!("failed to encode messages: {}", e))
        })?;

        let mut body = json!({
            "messages": messages,
            "system": [{"text": request.system_prompt}],
        });

        if let Some(max_tokens) = request.max_output_tokens {
            body["inferenceConfig"] = json!({"maxTokens": max_tokens});
        }

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "toolSpec": {
                            "name": tool.name,
                            "description": tool.description,
                            "inputSchema": {"json": tool.input_schema}
                        }
                    })
                })
                .collect();
            body["toolConfig"] = json!({"tools": tools});
        }

        Ok(body)
    }

    /// Pull the service's own message out of an error body, if it has one.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("Message"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| body.to_string())
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn converse(&self, request: &ChatRequest) -> Result<ChatResponse, InvokeError> {
        request.validate()?;

        let body = Self::build_request_body(request)?;
        let url = self.converse_url(&request.model_id)?;

        tracing::info!(
            model = %request.model_id,
            region = %self.region,
            auth = self.auth_scheme(),
            turns = request.messages.len(),
            tools = request.tools.len(),
            "sending converse request"
        );

        let payload = serde_json::to_vec(&body).map_err(|e| {
            InvokeError::InvalidRequest(format!("failed to encode request body: {}", e))
        })?;

        let mut http_request = self
            .client
            .post(url.clone())
            .header("content-type", "application/json");
        http_request = match &self.auth {
            Auth::ApiKey(api_key) => http_request.bearer_auth(api_key),
            Auth::SigV4(provider) => {
                for (name, value) in self.sigv4_headers(provider, &url, &payload).await? {
                    http_request = http_request.header(name, value);
                }
                http_request
            }
        };

        let response = http_request
            .body(payload)
            .send()
            .await
            .map_err(|e| InvokeError::Transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let error_body = response.text().await.unwrap_or_default();
            return Err(InvokeError::Credentials(format!(
                "{}: {}",
                status,
                Self::error_message(&error_body)
            )));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(InvokeError::Service {
                status: status.as_u16(),
                message: Self::error_message(&error_body),
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| InvokeError::MalformedResponse(format!("failed to parse JSON: {}", e)))?;

        tracing::debug!(envelope = %envelope, "converse response");

        let parsed = ChatResponse::from_envelope(envelope)?;
        tracing::info!(
            model = %request.model_id,
            stop_reason = ?parsed.stop_reason,
            output_tokens = parsed.usage.output_tokens,
            "converse response received"
        );
        Ok(parsed)
    }

    fn provider_name(&self) -> &str {
        "bedrock"
    }
}
