// ABOUTME: The playbook demos, each a linear build-request, invoke, print sequence.
// ABOUTME: Demos write to any io::Write so tests can capture exactly what a user would see.

pub mod guardrail;
pub mod reasoning;
pub mod report;
pub mod support;

pub use guardrail::GuardrailResponder;
pub use reasoning::ReasoningStyle;
pub use support::support_swarm;
pub use report::{failure_category, write_failure_note};
