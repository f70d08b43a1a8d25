// ABOUTME: Core library for playbook, containing the Converse message model and request/response envelopes.
// ABOUTME: Also owns client configuration resolution and the invocation error taxonomy shared by all demos.

pub mod config;
pub mod error;
pub mod message;
pub mod request;

pub use config::{ClientConfig, ConfigOverrides, CredentialSource, DEFAULT_REGION};
pub use error::InvokeError;
pub use message::{
    ContentBlock, Message, Role, ToolResult, ToolResultContent, ToolResultStatus, ToolUse,
};
pub use request::{ChatRequest, ChatResponse, StopReason, ToolSpec, Usage};
