use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool call waiting for the user's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub tool_call_id: String,
    pub name: String,
    pub args: Value,
    pub question: String,
}

/// Progress reported while an agent turn runs.
///
/// Serialized with a `type` tag, which is the frame format of the chat
/// streaming endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Streamed model output.
    Token { content: String },
    /// A tool is about to run.
    ToolStart { name: String, input: Value },
    /// A tool finished (successfully or not).
    ToolEnd { name: String, output: String },
    /// The turn paused for approval.
    Interrupt { content: Vec<ApprovalRequest> },
    /// The turn failed.
    Error { message: String },
}

impl AgentEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            AgentEvent::Token { .. } => "token",
            AgentEvent::ToolStart { .. } => "tool_start",
            AgentEvent::ToolEnd { .. } => "tool_end",
            AgentEvent::Interrupt { .. } => "interrupt",
            AgentEvent::Error { .. } => "error",
        }
    }
}
