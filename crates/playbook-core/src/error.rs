// ABOUTME: Error taxonomy for model invocations: credentials, transport, malformed responses, everything else.
// ABOUTME: Each variant maps to a category name and a static explanation printed by the top-level handler.

use thiserror::Error;

/// Errors that can occur while invoking a hosted model.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("service error {status}: {message}")]
    Service { status: u16, message: String },
}

impl InvokeError {
    /// Name of the failure category, printed in place of a stack trace.
    pub fn category(&self) -> &'static str {
        match self {
            InvokeError::Credentials(_) => "CredentialsError",
            InvokeError::Transport(_) => "TransportError",
            InvokeError::MalformedResponse(_) => "MalformedResponseError",
            InvokeError::InvalidRequest(_) | InvokeError::Service { .. } => "Error",
        }
    }

    /// Static remediation hint for the category.
    pub fn explanation(&self) -> &'static str {
        match self {
            InvokeError::Credentials(_) => {
                "AWS credentials are required: use a profile (--profile or AWS_PROFILE), access keys in the environment, or a Bedrock API key in AWS_BEARER_TOKEN_BEDROCK, and make sure the model is enabled for your account."
            }
            InvokeError::Transport(_) => {
                "The Bedrock endpoint could not be reached. Check the region, the endpoint URL and your network."
            }
            InvokeError::MalformedResponse(_) => {
                "The endpoint answered, but not with a Converse response envelope."
            }
            InvokeError::InvalidRequest(_) | InvokeError::Service { .. } => {
                "The request could not be completed."
            }
        }
    }
}
