// ABOUTME: Entry point for the playbook binary.
// ABOUTME: Parses CLI arguments, initializes tracing, resolves the Bedrock client and runs one demo.

use std::io::Write;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use playbook_agent::{ChatInvoker, HandoffExecutor, create_model_client};
use playbook_core::{ClientConfig, ConfigOverrides};
use playbook_demos::{GuardrailResponder, guardrail, reasoning, support, write_failure_note};

/// Bedrock playbook demos
#[derive(Parser, Debug)]
#[command(name = "playbook")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Named AWS credential profile used to sign requests
    #[arg(long, global = true)]
    profile: Option<String>,

    /// AWS region of the Bedrock runtime
    #[arg(long, global = true)]
    region: Option<String>,

    /// Override the Bedrock runtime endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Customer-service chatbot restricted to Unicorn Inc. topics
    Guardrail {
        #[arg(long, default_value = guardrail::SAMPLE_QUERY)]
        query: String,
        #[arg(long, default_value = guardrail::MODEL_ID)]
        model: String,
    },
    /// Ask one question under three reasoning styles
    Compare {
        #[arg(long, default_value = reasoning::TEST_QUESTION)]
        question: String,
        #[arg(long, default_value = reasoning::MODEL_ID)]
        model: String,
    },
    /// Five-agent customer support swarm
    Support {
        #[arg(long, default_value = support::SAMPLE_QUERY)]
        query: String,
        #[arg(long, default_value = support::MODEL_ID)]
        model: String,
    },
}

impl Command {
    fn about(&self) -> &'static str {
        match self {
            Command::Guardrail { .. } => guardrail::ABOUT,
            Command::Compare { .. } => reasoning::ABOUT,
            Command::Support { .. } => support::ABOUT,
        }
    }
}

/// Resolve overrides from the global flags against the environment.
fn resolve_config(cli: &Cli) -> ClientConfig {
    let overrides = ConfigOverrides {
        profile: cli.profile.clone(),
        region: cli.region.clone(),
        endpoint: cli.endpoint.clone(),
        ..ConfigOverrides::default()
    };
    ClientConfig::resolve(&overrides)
}

async fn run_demo<W: Write>(
    command: Command,
    config: &ClientConfig,
    out: &mut W,
) -> anyhow::Result<()> {
    tracing::info!(config = ?config, "resolved client configuration");
    let client = create_model_client(config);

    match command {
        Command::Guardrail { query, model } => {
            let responder = GuardrailResponder::new(client, &model);
            guardrail::run(&responder, &query, out).await
        }
        Command::Compare { question, model } => {
            let invoker =
                ChatInvoker::new(client, model).with_max_output_tokens(reasoning::MAX_OUTPUT_TOKENS);
            reasoning::compare(&invoker, &question, out).await?;
            Ok(())
        }
        Command::Support { query, model } => {
            let swarm = support::support_swarm()?;
            let executor = HandoffExecutor::new(client, model);
            support::run(&executor, &swarm, &query, out).await?;
            Ok(())
        }
    }
}

/// Run one demo; a failure becomes a note on `out` instead of an error.
async fn run_and_report<W: Write>(command: Command, config: &ClientConfig, out: &mut W) {
    let about = command.about();
    if let Err(err) = run_demo(command, config, &mut *out).await {
        tracing::error!(error = %err, "demo failed");
        if let Err(io_err) = write_failure_note(out, &err, about) {
            tracing::error!(error = %io_err, "could not print failure note");
        }
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("playbook=info,playbook_agent=info,playbook_demos=info")
        }))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli);
    run_and_report(cli.command, &config, &mut std::io::stdout()).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(endpoint: &str) -> ClientConfig {
        ClientConfig {
            profile: None,
            region: "us-east-1".to_string(),
            endpoint: endpoint.to_string(),
            api_key: Some("test-key".to_string()),
        }
    }

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["playbook"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let cli = Cli::try_parse_from([
            "playbook", "--region", "eu-west-1", "compare", "--profile", "demo",
        ])
        .unwrap();
        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        assert_eq!(cli.profile.as_deref(), Some("demo"));
        match cli.command {
            Command::Compare { question, model } => {
                assert_eq!(question, reasoning::TEST_QUESTION);
                assert_eq!(model, reasoning::MODEL_ID);
            }
            other => panic!("expected compare, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failure_is_printed_as_a_note() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", mockito::Matcher::Any)
            .with_status(403)
            .with_body(r#"{"message":"You don't have access to the model"}"#)
            .create_async()
            .await;
        let mut out = Vec::new();

        run_and_report(command(&["guardrail"]), &config_for(&server.url()), &mut out).await;

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("\nNote: "));
        assert!(printed.contains("Error: CredentialsError"));
        assert!(printed.ends_with(&format!("{}\n", guardrail::ABOUT)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_note() {
        let mut out = Vec::new();

        run_and_report(command(&["compare"]), &config_for("http://127.0.0.1:1"), &mut out).await;

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Error: TransportError"));
        assert!(printed.contains(reasoning::ABOUT));
        assert!(!printed.contains("Interleaved Thinking Output:"));
    }

    #[tokio::test]
    async fn success_prints_only_demo_output() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/model/anthropic.claude-3-haiku-20240307-v1:0/converse")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"output":{"message":{"content":[{"text":"We offer X, Y, Z cards."}]}}}"#)
            .create_async()
            .await;
        let mut out = Vec::new();

        run_and_report(command(&["guardrail"]), &config_for(&server.url()), &mut out).await;

        assert_eq!(String::from_utf8(out).unwrap(), "We offer X, Y, Z cards.\n");
    }
}
