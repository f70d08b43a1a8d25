// ABOUTME: The five customer-support agents and the limits their swarm runs under.
// ABOUTME: The orchestrator routes; each specialist owns exactly one mock lookup.

use std::sync::Arc;
use std::time::Duration;

use playbook_agent::{AgentDescriptor, Swarm, SwarmError, SwarmLimits};

use super::tools::{
    CheckOrderStatusTool, DiagnoseTechnicalIssueTool, GetProductInfoTool, InvestigateChargeTool,
};

pub const ENTRY_POINT: &str = "orchestrator";

pub const MAX_HANDOFFS: usize = 10;
pub const MAX_ITERATIONS: usize = 15;
pub const EXECUTION_TIMEOUT: Duration = Duration::from_secs(300);
pub const NODE_TIMEOUT: Duration = Duration::from_secs(120);

const ORCHESTRATOR_PROMPT: &str = "You are the central coordinator for customer support.

Analyze customer requests and route to specialized agents:
- technical_support: For technical issues and troubleshooting
- billing_support: For billing inquiries and charges
- product_info: For product details and recommendations
- order_status: For order tracking and shipping

Synthesize responses from multiple agents into a coherent answer.";

const TECHNICAL_PROMPT: &str = "You are a technical support specialist.

Diagnose technical issues and provide troubleshooting steps.
Use the diagnose_technical_issue tool for problem analysis.
Hand back to orchestrator when done.";

const BILLING_PROMPT: &str = "You are a billing support specialist.

Handle billing inquiries and investigate charges.
Use the investigate_charge tool to check charges.
Hand back to orchestrator when done.";

const PRODUCT_PROMPT: &str = "You are a product information specialist.

Provide product details and recommendations.
Use the get_product_info tool for product data.
Hand back to orchestrator when done.";

const ORDER_PROMPT: &str = "You are an order status specialist.

Track orders and provide shipping updates.
Use the check_order_status tool to check recent orders.
Provide clear information about order status and shipping.
Hand back to orchestrator when done.";

/// Orchestrator first, then the four specialists.
pub fn support_agents() -> Vec<AgentDescriptor> {
    vec![
        AgentDescriptor::new(
            ENTRY_POINT,
            "Central coordinator that routes requests and synthesizes responses",
            ORCHESTRATOR_PROMPT,
        ),
        AgentDescriptor::new(
            "technical_support",
            "Handles technical issues and troubleshooting",
            TECHNICAL_PROMPT,
        )
        .with_tool(Arc::new(DiagnoseTechnicalIssueTool)),
        AgentDescriptor::new(
            "billing_support",
            "Handles billing inquiries and charge investigations",
            BILLING_PROMPT,
        )
        .with_tool(Arc::new(InvestigateChargeTool)),
        AgentDescriptor::new(
            "product_info",
            "Provides product details and recommendations",
            PRODUCT_PROMPT,
        )
        .with_tool(Arc::new(GetProductInfoTool)),
        AgentDescriptor::new(
            "order_status",
            "Tracks orders and provides shipping updates",
            ORDER_PROMPT,
        )
        .with_tool(Arc::new(CheckOrderStatusTool)),
    ]
}

pub fn support_limits() -> SwarmLimits {
    SwarmLimits {
        max_handoffs: MAX_HANDOFFS,
        max_iterations: MAX_ITERATIONS,
        execution_timeout: EXECUTION_TIMEOUT,
        node_timeout: NODE_TIMEOUT,
    }
}

pub fn support_swarm() -> Result<Swarm, SwarmError> {
    Swarm::new(support_agents(), ENTRY_POINT, support_limits())
}
