// ABOUTME: End-to-end smoke tests: each demo talks to a mock Converse endpoint over HTTP.
// ABOUTME: Covers configuration resolution, the Bedrock client, the demos' printed output and the failure note.

use std::sync::Arc;

use playbook_agent::testing::MissingCredentials;
use playbook_agent::{
    BedrockClient, ChatInvoker, HandoffExecutor, ModelClient, SwarmStatus, create_model_client,
};
use playbook_core::{ClientConfig, ConfigOverrides};
use playbook_demos::{GuardrailResponder, failure_category, guardrail, reasoning, support, write_failure_note};

fn config_for(server_url: &str, api_key: Option<&str>) -> ClientConfig {
    let overrides = ConfigOverrides {
        region: Some("us-west-2".to_string()),
        endpoint: Some(server_url.to_string()),
        api_key: api_key.map(String::from),
        ..ConfigOverrides::default()
    };
    ClientConfig::resolve_with(&overrides, |_| None)
}

fn client_for(server_url: &str) -> Arc<dyn ModelClient> {
    Arc::new(BedrockClient::new(
        "smoke-key".to_string(),
        server_url.to_string(),
        "us-west-2".to_string(),
    ))
}

#[tokio::test]
async fn guardrail_demo_prints_reply_from_minimal_envelope() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/model/anthropic.claude-3-haiku-20240307-v1:0/converse")
        .match_header("authorization", "Bearer smoke-key")
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::Regex("credit cards available".to_string()),
            mockito::Matcher::Regex("virtual customer service agent".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"output":{"message":{"content":[{"text":"We offer X, Y, Z cards."}]}}}"#)
        .create_async()
        .await;

    let config = config_for(&server.url(), Some("smoke-key"));
    let client = create_model_client(&config);
    let responder = GuardrailResponder::new(client, guardrail::MODEL_ID);
    let mut out = Vec::new();

    guardrail::run(&responder, guardrail::SAMPLE_QUERY, &mut out)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "We offer X, Y, Z cards.\n");
    mock.assert_async().await;
}

#[tokio::test]
async fn missing_aws_credentials_is_a_credentials_failure() {
    let client = Arc::new(BedrockClient::with_credentials(
        MissingCredentials,
        "http://127.0.0.1:9".to_string(),
        "us-west-2".to_string(),
    ));
    let responder = GuardrailResponder::new(client, guardrail::MODEL_ID);

    let err = guardrail::run(&responder, guardrail::SAMPLE_QUERY, &mut Vec::new())
        .await
        .unwrap_err();

    assert_eq!(failure_category(&err), "CredentialsError");

    let mut out = Vec::new();
    write_failure_note(&mut out, &err, guardrail::ABOUT).unwrap();
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Error: CredentialsError"));
    assert!(printed.contains("Unicorn Inc."));
}

#[tokio::test]
async fn compare_demo_makes_three_calls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/model/amazon.nova-pro-v1:0/converse")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "inferenceConfig": {"maxTokens": 1000}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"output":{"message":{"role":"assistant","content":[{"text":"(2,3), (3,4)"}]}},"stopReason":"end_turn"}"#)
        .expect(3)
        .create_async()
        .await;

    let invoker = ChatInvoker::new(client_for(&server.url()), reasoning::MODEL_ID)
        .with_max_output_tokens(reasoning::MAX_OUTPUT_TOKENS);
    let mut out = Vec::new();

    let replies = reasoning::compare(&invoker, reasoning::TEST_QUESTION, &mut out)
        .await
        .unwrap();

    assert_eq!(replies.len(), 3);
    let printed = String::from_utf8(out).unwrap();
    let interleaved = printed.find("Interleaved Thinking Output:").unwrap();
    let recursive = printed.find("Recursive Reasoning Output:").unwrap();
    let staged = printed.find("Multistage Reasoning Output:").unwrap();
    assert!(interleaved < recursive && recursive < staged);
    mock.assert_async().await;
}

#[tokio::test]
async fn unauthorized_endpoint_reports_credentials_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", mockito::Matcher::Any)
        .with_status(401)
        .with_body(r#"{"message":"Invalid API key"}"#)
        .create_async()
        .await;

    let responder = GuardrailResponder::new(client_for(&server.url()), guardrail::MODEL_ID);
    let mut out = Vec::new();

    let err = guardrail::run(&responder, guardrail::SAMPLE_QUERY, &mut out)
        .await
        .unwrap_err();

    assert!(out.is_empty());
    assert_eq!(failure_category(&err), "CredentialsError");
}

#[tokio::test]
async fn support_demo_completes_when_orchestrator_answers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/model/us.anthropic.claude-sonnet-4-20250514-v1:0/converse")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"output":{"message":{"role":"assistant","content":[{"text":"Your order ships soon."}]}},"stopReason":"end_turn"}"#)
        .create_async()
        .await;

    let executor = HandoffExecutor::new(client_for(&server.url()), support::MODEL_ID);
    let swarm = support::support_swarm().unwrap();
    let mut out = Vec::new();

    let result = support::run(&executor, &swarm, support::SAMPLE_QUERY, &mut out)
        .await
        .unwrap();

    assert_eq!(result.status, SwarmStatus::Completed);
    assert_eq!(result.final_node(), Some("orchestrator"));
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Agent Collaboration Path:\n  1. orchestrator\n"));
    assert!(printed.contains("Your order ships soon."));
    mock.assert_async().await;
}
