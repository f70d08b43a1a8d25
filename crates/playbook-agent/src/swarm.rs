// ABOUTME: Swarm of cooperating agents: descriptors, limits, the SwarmExecutor seam and a hand-off executor.
// ABOUTME: Agents pass control with a handoff_to_agent tool; the first agent that answers without handing off ends the run.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use ulid::Ulid;

use playbook_core::{ChatRequest, InvokeError, Message, ToolResult, ToolSpec, ToolUse};

use crate::runtime::ModelClient;
use crate::tools::{Tool, ToolRegistry};

/// Name of the coordination tool injected into every agent.
pub const HANDOFF_TOOL_NAME: &str = "handoff_to_agent";

/// Upper bound on model turns inside one node (tool call, result, repeat).
const MAX_NODE_TURNS: usize = 10;

/// A named agent: its instructions, a description other agents see, and its tools.
#[derive(Clone)]
pub struct AgentDescriptor {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub tools: ToolRegistry,
}

impl AgentDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            system_prompt: system_prompt.into(),
            tools: ToolRegistry::new(),
        }
    }

    /// Bind a tool to this agent.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }
}

impl std::fmt::Debug for AgentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("tools", &self.tool_names())
            .finish()
    }
}

/// Execution limits for a swarm run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwarmLimits {
    /// Hand-offs allowed before the run fails.
    pub max_handoffs: usize,
    /// Node executions allowed before the run fails.
    pub max_iterations: usize,
    pub execution_timeout: Duration,
    pub node_timeout: Duration,
}

impl Default for SwarmLimits {
    fn default() -> Self {
        Self {
            max_handoffs: 20,
            max_iterations: 20,
            execution_timeout: Duration::from_secs(900),
            node_timeout: Duration::from_secs(300),
        }
    }
}

/// Errors that prevent a swarm run from starting or a node from finishing.
#[derive(Debug, thiserror::Error)]
pub enum SwarmError {
    #[error("invalid swarm configuration: {0}")]
    InvalidConfig(String),

    #[error("agent {node} did not finish within {turns} model turns")]
    TurnLimit { node: String, turns: usize },

    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

/// A validated set of agents with an entry point and limits.
#[derive(Debug, Clone)]
pub struct Swarm {
    agents: Vec<AgentDescriptor>,
    entry_point: String,
    limits: SwarmLimits,
}

impl Swarm {
    /// Validate and assemble a swarm. Agent names must be unique and the
    /// entry point must be one of them.
    pub fn new(
        agents: Vec<AgentDescriptor>,
        entry_point: &str,
        limits: SwarmLimits,
    ) -> Result<Self, SwarmError> {
        if agents.is_empty() {
            return Err(SwarmError::InvalidConfig(
                "a swarm needs at least one agent".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for agent in &agents {
            if agent.name.trim().is_empty() {
                return Err(SwarmError::InvalidConfig("agent name is empty".to_string()));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(SwarmError::InvalidConfig(format!(
                    "duplicate agent name: {}",
                    agent.name
                )));
            }
        }

        if !seen.contains(entry_point) {
            return Err(SwarmError::InvalidConfig(format!(
                "entry point {} is not one of the swarm's agents",
                entry_point
            )));
        }

        Ok(Self {
            agents,
            entry_point: entry_point.to_string(),
            limits,
        })
    }

    pub fn agents(&self) -> &[AgentDescriptor] {
        &self.agents
    }

    pub fn agent(&self, name: &str) -> Option<&AgentDescriptor> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn limits(&self) -> &SwarmLimits {
        &self.limits
    }

    /// Every agent except `name`, in declaration order.
    fn peers_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AgentDescriptor> + 'a {
        self.agents.iter().filter(move |a| a.name != name)
    }
}

/// Final state of a swarm run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwarmStatus {
    Completed,
    Failed,
}

impl SwarmStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SwarmStatus::Completed => "COMPLETED",
            SwarmStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for SwarmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the execution history.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisit {
    pub node_id: String,
    pub started_at: DateTime<Utc>,
}

/// What a node produced the last time it ran.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeResult {
    pub result: String,
    pub handoff_to: Option<String>,
    pub tool_calls: usize,
    pub model_turns: usize,
    pub execution_time: Duration,
}

/// Outcome of a swarm run: status, visited nodes in order, and per-node results.
#[derive(Debug, Clone)]
pub struct SwarmResult {
    pub run_id: Ulid,
    pub status: SwarmStatus,
    pub node_history: Vec<NodeVisit>,
    pub results: HashMap<String, NodeResult>,
    pub failure: Option<String>,
    pub execution_time: Duration,
}

impl SwarmResult {
    /// Identifier of the last visited node.
    pub fn final_node(&self) -> Option<&str> {
        self.node_history.last().map(|v| v.node_id.as_str())
    }

    /// Result text of the last visited node, if it produced one.
    pub fn final_result(&self) -> Option<&str> {
        self.final_node()
            .and_then(|id| self.results.get(id))
            .map(|r| r.result.as_str())
    }
}

/// Executes a swarm against a task. Routing, hand-off decisions and limit
/// enforcement live behind this trait.
#[async_trait]
pub trait SwarmExecutor: Send + Sync {
    async fn execute(&self, swarm: &Swarm, task: &str) -> Result<SwarmResult, SwarmError>;
}

/// A parsed handoff_to_agent call.
#[derive(Debug, Clone, PartialEq)]
struct Handoff {
    agent_name: String,
    message: String,
    context: Option<Value>,
}

/// What one node execution produced.
#[derive(Debug)]
struct NodeOutcome {
    text: String,
    handoff: Option<Handoff>,
    tool_calls: usize,
    model_turns: usize,
}

/// Shared state threaded through a run.
#[derive(Debug, Default)]
struct RunState {
    handoff_message: Option<String>,
    shared_context: Vec<(String, Value)>,
    path: Vec<String>,
}

/// Built-in executor: drives each agent through a tool-use loop on a
/// ModelClient and follows handoff_to_agent calls between agents.
pub struct HandoffExecutor {
    client: Arc<dyn ModelClient>,
    model_id: String,
}

impl HandoffExecutor {
    pub fn new(client: Arc<dyn ModelClient>, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    /// Run one agent until it answers, hands off, or exhausts its turns.
    async fn run_node(
        &self,
        swarm: &Swarm,
        agent: &AgentDescriptor,
        prompt: String,
    ) -> Result<NodeOutcome, SwarmError> {
        let mut tools = agent.tools.specs();
        tools.push(handoff_tool_spec(swarm, &agent.name));

        let mut messages = vec![Message::user_text(prompt)];
        let mut tool_calls = 0;

        for turn in 1..=MAX_NODE_TURNS {
            let request = ChatRequest {
                model_id: self.model_id.clone(),
                system_prompt: agent.system_prompt.clone(),
                messages: messages.clone(),
                max_output_tokens: None,
                tools: tools.clone(),
            };

            let response = self.client.converse(&request).await?;
            let tool_uses = response.tool_uses();
            let text = response.message.joined_text();
            messages.push(response.message);

            if tool_uses.is_empty() {
                return Ok(NodeOutcome {
                    text,
                    handoff: None,
                    tool_calls,
                    model_turns: turn,
                });
            }

            let mut results = Vec::with_capacity(tool_uses.len());
            let mut handoff: Option<Handoff> = None;

            for tool_use in &tool_uses {
                tool_calls += 1;
                if tool_use.name != HANDOFF_TOOL_NAME {
                    results.push(agent.tools.execute(tool_use).await);
                    continue;
                }

                match parse_handoff(swarm, &agent.name, tool_use) {
                    Ok(parsed) if handoff.is_none() => {
                        results.push(ToolResult::json(
                            &tool_use.tool_use_id,
                            json!({"status": "handing off", "agent_name": parsed.agent_name}),
                        ));
                        handoff = Some(parsed);
                    }
                    Ok(_) => results.push(ToolResult::error(
                        &tool_use.tool_use_id,
                        "only one hand-off per turn is honoured",
                    )),
                    Err(message) => {
                        tracing::warn!(node = %agent.name, error = %message, "rejected hand-off");
                        results.push(ToolResult::error(&tool_use.tool_use_id, message));
                    }
                }
            }

            if let Some(handoff) = handoff {
                let text = if text.trim().is_empty() {
                    handoff.message.clone()
                } else {
                    text
                };
                return Ok(NodeOutcome {
                    text,
                    handoff: Some(handoff),
                    tool_calls,
                    model_turns: turn,
                });
            }

            messages.push(Message::tool_results(results));
        }

        Err(SwarmError::TurnLimit {
            node: agent.name.clone(),
            turns: MAX_NODE_TURNS,
        })
    }
}

#[async_trait]
impl SwarmExecutor for HandoffExecutor {
    async fn execute(&self, swarm: &Swarm, task: &str) -> Result<SwarmResult, SwarmError> {
        if task.trim().is_empty() {
            return Err(SwarmError::InvalidConfig("task is empty".to_string()));
        }

        let run_id = Ulid::new();
        let limits = *swarm.limits();
        let started = Instant::now();

        let mut state = RunState::default();
        let mut node_history = Vec::new();
        let mut results = HashMap::new();
        let mut handoffs = 0usize;
        let mut current = swarm.entry_point().to_string();

        tracing::info!(
            run_id = %run_id,
            entry_point = %current,
            agents = swarm.agents().len(),
            "swarm run started"
        );

        let failure: Option<String> = loop {
            if node_history.len() >= limits.max_iterations {
                break Some(format!(
                    "max iterations reached ({})",
                    limits.max_iterations
                ));
            }

            let elapsed = started.elapsed();
            if elapsed >= limits.execution_timeout {
                break Some(format!(
                    "execution timed out after {:.1}s",
                    limits.execution_timeout.as_secs_f64()
                ));
            }
            let remaining = limits.execution_timeout - elapsed;
            let budget = limits.node_timeout.min(remaining);

            let Some(agent) = swarm.agent(&current) else {
                break Some(format!("agent {} is not part of the swarm", current));
            };

            node_history.push(NodeVisit {
                node_id: agent.name.clone(),
                started_at: Utc::now(),
            });

            let prompt = build_node_prompt(swarm, &agent.name, task, &state);
            tracing::info!(
                run_id = %run_id,
                node = %agent.name,
                iteration = node_history.len(),
                "swarm node started"
            );

            let node_started = Instant::now();
            let attempt = match tokio::time::timeout(budget, self.run_node(swarm, agent, prompt)).await
            {
                Ok(Ok(outcome)) => Ok(outcome),
                Err(_) if budget < limits.node_timeout => Err(format!(
                    "execution timed out after {:.1}s",
                    limits.execution_timeout.as_secs_f64()
                )),
                Err(_) => Err(format!(
                    "node {} timed out after {:.1}s",
                    agent.name,
                    limits.node_timeout.as_secs_f64()
                )),
                Ok(Err(e)) => Err(format!("node {} failed: {}", agent.name, e)),
            };
            let outcome = match attempt {
                Ok(outcome) => outcome,
                Err(reason) => {
                    // the failed visit has no result; an earlier visit's must not stand in
                    results.remove(&agent.name);
                    break Some(reason);
                }
            };

            results.insert(
                agent.name.clone(),
                NodeResult {
                    result: outcome.text,
                    handoff_to: outcome.handoff.as_ref().map(|h| h.agent_name.clone()),
                    tool_calls: outcome.tool_calls,
                    model_turns: outcome.model_turns,
                    execution_time: node_started.elapsed(),
                },
            );
            state.path.push(agent.name.clone());

            let Some(handoff) = outcome.handoff else {
                break None;
            };

            if handoffs >= limits.max_handoffs {
                break Some(format!("max handoffs reached ({})", limits.max_handoffs));
            }
            handoffs += 1;

            tracing::info!(
                run_id = %run_id,
                from = %agent.name,
                to = %handoff.agent_name,
                handoffs,
                "swarm hand-off"
            );

            if let Some(context) = handoff.context {
                state.shared_context.push((agent.name.clone(), context));
            }
            state.handoff_message = Some(handoff.message);
            current = handoff.agent_name;
        };

        let status = match &failure {
            None => SwarmStatus::Completed,
            Some(reason) => {
                tracing::warn!(run_id = %run_id, reason = %reason, "swarm run failed");
                SwarmStatus::Failed
            }
        };

        let execution_time = started.elapsed();
        tracing::info!(
            run_id = %run_id,
            status = %status,
            nodes = node_history.len(),
            elapsed_ms = execution_time.as_millis() as u64,
            "swarm run finished"
        );

        Ok(SwarmResult {
            run_id,
            status,
            node_history,
            results,
            failure,
            execution_time,
        })
    }
}

/// Tool spec for handing control to another agent. The target must be one
/// of the caller's peers.
fn handoff_tool_spec(swarm: &Swarm, caller: &str) -> ToolSpec {
    let peers: Vec<&str> = swarm.peers_of(caller).map(|a| a.name.as_str()).collect();
    ToolSpec {
        name: HANDOFF_TOOL_NAME.to_string(),
        description: "Transfer control to another agent in the swarm. Use this when another \
            agent is better suited to continue the task. Include a message explaining what \
            they should do and any context they need."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "agent_name": {
                    "type": "string",
                    "enum": peers,
                    "description": "Name of the agent to hand off to."
                },
                "message": {
                    "type": "string",
                    "description": "What the next agent should do."
                },
                "context": {
                    "type": "object",
                    "description": "Optional structured findings to share with the remaining agents."
                }
            },
            "required": ["agent_name", "message"]
        }),
    }
}

/// Validate a handoff_to_agent call. Errors are returned as text for the model.
fn parse_handoff(swarm: &Swarm, caller: &str, tool_use: &ToolUse) -> Result<Handoff, String> {
    let agent_name = tool_use
        .input
        .get("agent_name")
        .and_then(|n| n.as_str())
        .ok_or_else(|| "handoff_to_agent requires agent_name".to_string())?;

    if agent_name == caller {
        return Err(format!("{} cannot hand off to itself", caller));
    }
    if swarm.agent(agent_name).is_none() {
        let peers: Vec<&str> = swarm.peers_of(caller).map(|a| a.name.as_str()).collect();
        return Err(format!(
            "unknown agent {}; available agents: {}",
            agent_name,
            peers.join(", ")
        ));
    }

    let message = tool_use
        .input
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or_default()
        .to_string();
    let context = tool_use
        .input
        .get("context")
        .filter(|c| c.as_object().is_some_and(|o| !o.is_empty()))
        .cloned();

    Ok(Handoff {
        agent_name: agent_name.to_string(),
        message,
        context,
    })
}

/// Build the user prompt a node starts from: the hand-off message, the
/// original request, who already worked on it, shared context, and peers.
fn build_node_prompt(swarm: &Swarm, node: &str, task: &str, state: &RunState) -> String {
    let mut parts = Vec::new();

    if let Some(message) = &state.handoff_message {
        parts.push(format!("Handoff Message: {}", message));
    }

    parts.push(format!("User Request: {}", task));

    if !state.path.is_empty() {
        parts.push(format!(
            "Previous agents who worked on this: {}",
            state.path.join(" → ")
        ));
    }

    if !state.shared_context.is_empty() {
        let lines: Vec<String> = state
            .shared_context
            .iter()
            .map(|(agent, context)| format!("  • {}: {}", agent, context))
            .collect();
        parts.push(format!(
            "Shared knowledge from previous agents:\n{}",
            lines.join("\n")
        ));
    }

    let peers: Vec<String> = swarm
        .peers_of(node)
        .map(|a| format!("  Agent name: {}. Agent description: {}", a.name, a.description))
        .collect();
    if !peers.is_empty() {
        parts.push(format!(
            "Other agents available for collaboration:\n{}",
            peers.join("\n")
        ));
    }

    parts.push(format!(
        "You can use the {} tool to pass the task to another agent. \
         If you answer without handing off, the swarm treats the task as complete.",
        HANDOFF_TOOL_NAME
    ));

    parts.join("\n\n")
}
