// ABOUTME: Agent runtime for playbook: the ModelClient seam, the Bedrock adapter and the swarm executor.
// ABOUTME: Demos depend on the traits here so they can run against a stub client in tests.

pub mod client;
pub mod invoker;
pub mod providers;
pub mod runtime;
pub mod swarm;
pub mod testing;
pub mod tools;

pub use client::create_model_client;
pub use invoker::ChatInvoker;
pub use providers::bedrock::BedrockClient;
pub use runtime::ModelClient;
pub use swarm::{
    AgentDescriptor, HANDOFF_TOOL_NAME, HandoffExecutor, NodeResult, NodeVisit, Swarm, SwarmError, SwarmExecutor,
    SwarmLimits, SwarmResult, SwarmStatus,
};
pub use tools::{Tool, ToolOutput, ToolRegistry};
