// ABOUTME: Customer-support swarm demo: five agents, four mock lookups, one swarm run.
// ABOUTME: Prints the run status, the path through the agents and the last agent's answer.

pub mod agents;
pub mod tools;

use std::io::Write;

use playbook_agent::{Swarm, SwarmExecutor, SwarmResult};

pub use agents::{
    ENTRY_POINT, EXECUTION_TIMEOUT, MAX_HANDOFFS, MAX_ITERATIONS, NODE_TIMEOUT, support_agents,
    support_limits, support_swarm,
};
pub use tools::{check_order_status, diagnose_technical_issue, get_product_info, investigate_charge};

pub const MODEL_ID: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

pub const SAMPLE_QUERY: &str = "Hi, I ordered a laptop 3 days ago but haven't received any shipping
confirmation. Also, I noticed an extra charge on my credit card that I
don't understand. Can you help me figure out what's going on and maybe
suggest a better laptop if this one is delayed?";

pub const ABOUT: &str = "This demo runs a five-agent customer support swarm on Amazon Bedrock.
It requires:
  - AWS credentials (a profile or access keys) or a Bedrock API key in AWS_BEARER_TOKEN_BEDROCK
  - access to the Claude Sonnet 4 inference profile in the selected region

Expected output: the agents the request passed through and the final answer.";

const ROSTER: [&str; 5] = [
    "Orchestrator - Central coordinator",
    "Technical Support - Problem solver",
    "Billing Support - Financial specialist",
    "Product Information - Product expert",
    "Order Status - Logistics coordinator",
];

const BENEFITS: [&str; 5] = [
    "Specialized expertise per domain",
    "Autonomous agent collaboration",
    "Scalable and maintainable design",
    "Dynamic routing based on query",
    "Clear separation of concerns",
];

fn rule() -> String {
    "=".repeat(50)
}

fn heading<W: Write>(out: &mut W, title: &str) -> std::io::Result<()> {
    writeln!(out, "\n{}", rule())?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", rule())
}

/// Run the support swarm on `query` and print its report.
///
/// A run that ends `FAILED` is still reported; only errors that stop the
/// executor from producing a result at all are returned.
pub async fn run<W: Write>(
    executor: &dyn SwarmExecutor,
    swarm: &Swarm,
    query: &str,
    out: &mut W,
) -> anyhow::Result<SwarmResult> {
    writeln!(out, "Multi-Agent Orchestrator Demo")?;
    writeln!(out, "{}", rule())?;

    writeln!(out, "\nSwarm Architecture Initialized!")?;
    writeln!(out, "\nSpecialized Agents:")?;
    for (i, entry) in ROSTER.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, entry)?;
    }

    heading(out, "Sample Customer Query:")?;
    writeln!(out, "{}", query)?;

    heading(out, "Processing with Swarm...")?;
    out.flush()?;

    let result = executor.execute(swarm, query).await?;

    writeln!(out, "\nExecution Status: {}", result.status)?;
    writeln!(out, "\nAgent Collaboration Path:")?;
    for (i, visit) in result.node_history.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, visit.node_id)?;
    }

    heading(out, "Final Response:")?;
    match result.final_result() {
        Some(text) => writeln!(out, "\n{}", text)?,
        None => writeln!(out, "\nNo agent produced a response.")?,
    }
    if let Some(reason) = &result.failure {
        writeln!(out, "Failure: {}", reason)?;
    }

    heading(out, "Architecture Benefits:")?;
    for benefit in BENEFITS {
        writeln!(out, "✓ {}", benefit)?;
    }

    heading(out, "Script completed successfully!")?;

    tracing::info!(
        run_id = %result.run_id,
        status = %result.status,
        nodes = result.node_history.len(),
        "support demo finished"
    );

    Ok(result)
}
