// ABOUTME: Guardrailed responder: a customer-service system prompt that restricts topics, one user question.
// ABOUTME: The restriction lives only in the prompt text; nothing here inspects or filters the reply.

use std::io::Write;
use std::sync::Arc;

use playbook_agent::{ChatInvoker, ModelClient};
use playbook_core::InvokeError;

pub const MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";

pub const SAMPLE_QUERY: &str = "Hi, what are the credit cards available";

pub const SYSTEM_PROMPT: &str = "You are a virtual customer service agent for Unicorn Inc., a fintech company in the USA.

<rules>
- Only respond to questions related to Unicorn Inc.'s products and services.
- If asked about anything else, politely inform the user that you can only assist with Unicorn Inc. related inquiries.
- Do not discuss any sensitive financial information or provide financial advice.
- Keep responses concise and professional.
- The company phone number is +100022200
- The company email is unicorn@example.com
</rules>";

/// Shown under a failure note.
pub const ABOUT: &str = "This demo runs a customer service chatbot for Unicorn Inc. on Amazon Bedrock.
It requires:
  - AWS credentials (a profile or access keys) or a Bedrock API key in AWS_BEARER_TOKEN_BEDROCK
  - access to the Amazon Bedrock runtime in the selected region
  - the Claude 3 Haiku model enabled in your AWS account

Expected output: the chatbot answers credit card inquiries for Unicorn Inc.";

/// Answers customer questions under the Unicorn Inc. system prompt.
pub struct GuardrailResponder {
    invoker: ChatInvoker,
}

impl GuardrailResponder {
    pub fn new(client: Arc<dyn ModelClient>, model_id: &str) -> Self {
        Self {
            invoker: ChatInvoker::new(client, model_id),
        }
    }

    pub fn model_id(&self) -> &str {
        self.invoker.model_id()
    }

    /// Send the query and return the reply text.
    pub async fn respond(&self, query: &str) -> Result<String, InvokeError> {
        let response = self.invoker.invoke(SYSTEM_PROMPT, query).await?;
        tracing::debug!(envelope = %response.raw_envelope, "guardrail response envelope");
        response.output_text().map(String::from)
    }
}

/// Run the demo: print the reply text and nothing else.
pub async fn run<W: Write>(
    responder: &GuardrailResponder,
    query: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    tracing::info!(model = responder.model_id(), "running guardrail demo");
    let reply = responder.respond(query).await?;
    writeln!(out, "{}", reply)?;
    Ok(())
}
