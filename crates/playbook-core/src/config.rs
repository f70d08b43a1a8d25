// ABOUTME: Client configuration for the Bedrock endpoint: profile, region, endpoint URL and API key.
// ABOUTME: Resolution order is explicit argument, then environment variable, then a fixed fallback.

/// Region used when neither an argument nor the environment names one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Values supplied explicitly by the caller (typically CLI flags).
/// Any `Some` here wins over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

/// Resolved connection settings handed to the client constructor.
#[derive(Clone)]
pub struct ClientConfig {
    pub profile: Option<String>,
    pub region: String,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("profile", &self.profile)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Trim a candidate value and drop it if nothing is left.
fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

impl ClientConfig {
    /// Resolve configuration against the process environment.
    ///
    /// Environment variables:
    /// - AWS_PROFILE: named credential profile (optional)
    /// - AWS_REGION, then AWS_DEFAULT_REGION: region (default: us-east-1)
    /// - BEDROCK_ENDPOINT_URL: endpoint override (default: the regional bedrock-runtime host)
    /// - AWS_BEARER_TOKEN_BEDROCK: Bedrock API key (optional here, required to send requests)
    pub fn resolve(overrides: &ConfigOverrides) -> Self {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve configuration with an injectable environment lookup.
    pub fn resolve_with<F>(overrides: &ConfigOverrides, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| non_empty(lookup(key));

        let profile = non_empty(overrides.profile.clone()).or_else(|| env("AWS_PROFILE"));

        let region = non_empty(overrides.region.clone())
            .or_else(|| env("AWS_REGION"))
            .or_else(|| env("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let endpoint = non_empty(overrides.endpoint.clone())
            .or_else(|| env("BEDROCK_ENDPOINT_URL"))
            .unwrap_or_else(|| regional_endpoint(&region));

        let api_key =
            non_empty(overrides.api_key.clone()).or_else(|| env("AWS_BEARER_TOKEN_BEDROCK"));

        let config = Self {
            profile,
            region,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        };
        tracing::debug!(config = ?config, "resolved client configuration");
        config
    }
}

/// Where request credentials come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource<'a> {
    /// Bedrock API key sent as a bearer token.
    ApiKey(&'a str),
    /// SigV4 with the named profile tried first, then access keys in the environment.
    Profile(&'a str),
    /// SigV4 with the standard chain: environment access keys, then the default profile.
    DefaultChain,
}

impl ClientConfig {
    /// An API key wins; otherwise requests are signed with AWS credentials.
    pub fn credential_source(&self) -> CredentialSource<'_> {
        match (&self.api_key, &self.profile) {
            (Some(api_key), _) => CredentialSource::ApiKey(api_key),
            (None, Some(profile)) => CredentialSource::Profile(profile),
            (None, None) => CredentialSource::DefaultChain,
        }
    }
}

/// The public bedrock-runtime host for a region.
pub fn regional_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{}.amazonaws.com", region)
}
