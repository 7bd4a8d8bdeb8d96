//! Core agent loop implementation.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::llm::{ChatMessage, ChatResponse, LlmClient, Role, ToolCall, ToolSchema};
use crate::tools::ToolRegistry;

use super::events::{AgentEvent, ApprovalRequest};

/// Channel the loop reports progress on.
pub type EventSender = mpsc::UnboundedSender<AgentEvent>;

/// One thread's memory: the history (without the system prompt) and any tool
/// calls paused for approval.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub messages: Vec<ChatMessage>,
    /// Model calls made over the lifetime of the thread
    pub llm_calls: usize,
    pending: Option<Vec<ToolCall>>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Whether the thread is paused waiting for a decision.
    pub fn is_interrupted(&self) -> bool {
        self.pending.is_some()
    }

    /// Content of the last assistant message.
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && m.content.as_deref().is_some_and(|c| !c.is_empty()))
            .and_then(|m| m.content.as_deref())
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The model answered without requesting tools.
    Completed { reply: String },
    /// The turn is paused until [`Agent::resume`] is called.
    Interrupted { requests: Vec<ApprovalRequest> },
}

/// A tool-calling agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: String,
    system_prompt: String,
    max_iterations: usize,
    require_approval: bool,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            tools,
            model: model.into(),
            system_prompt: system_prompt.into(),
            max_iterations: 25,
            require_approval: true,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Whether approval-gated tools pause the turn. When disabled they run
    /// immediately like any other tool.
    pub fn with_approval(mut self, require_approval: bool) -> Self {
        self.require_approval = require_approval;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run the loop on a conversation whose last message is new user input.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        events: Option<&EventSender>,
    ) -> anyhow::Result<RunOutcome> {
        if conversation.is_interrupted() {
            return Err(anyhow::anyhow!(
                "Conversation is waiting for approval; resume it before sending new messages"
            ));
        }
        self.drive(conversation, events).await
    }

    /// Continue a paused turn with the user's decision.
    pub async fn resume(
        &self,
        conversation: &mut Conversation,
        approved: bool,
        events: Option<&EventSender>,
    ) -> anyhow::Result<RunOutcome> {
        let pending = conversation
            .pending
            .take()
            .ok_or_else(|| anyhow::anyhow!("Conversation has nothing waiting for approval"))?;

        tracing::info!(approved, calls = pending.len(), "Resuming interrupted turn");
        self.execute_batch(conversation, &pending, approved, events)
            .await;
        self.drive(conversation, events).await
    }

    async fn drive(
        &self,
        conversation: &mut Conversation,
        events: Option<&EventSender>,
    ) -> anyhow::Result<RunOutcome> {
        let tool_schemas = self.tools.get_tool_schemas();

        for iteration in 0..self.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let response = self
                .call_model(conversation, &tool_schemas, events)
                .await?;
            conversation.llm_calls += 1;

            if let Some(tool_calls) = response.tool_calls.filter(|calls| !calls.is_empty()) {
                conversation.push(ChatMessage {
                    role: Role::Assistant,
                    content: response.content.clone(),
                    tool_calls: Some(tool_calls.clone()),
                    tool_call_id: None,
                });

                let needs_approval = self.require_approval
                    && tool_calls
                        .iter()
                        .any(|call| self.tools.requires_approval(&call.function.name));
                if needs_approval {
                    let requests = approval_requests(&tool_calls, &self.tools);
                    tracing::info!(
                        tools = ?requests.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
                        "Pausing for approval"
                    );
                    conversation.pending = Some(tool_calls);
                    emit(
                        events,
                        AgentEvent::Interrupt {
                            content: requests.clone(),
                        },
                    );
                    return Ok(RunOutcome::Interrupted { requests });
                }

                self.execute_batch(conversation, &tool_calls, true, events)
                    .await;
                continue;
            }

            // No tool calls - this is the final response
            let content = response.content.unwrap_or_default();
            if content.is_empty() {
                return Err(anyhow::anyhow!("LLM returned empty response"));
            }
            conversation.push(ChatMessage::assistant(content.clone()));
            return Ok(RunOutcome::Completed { reply: content });
        }

        Err(anyhow::anyhow!(
            "Max iterations ({}) reached without completion",
            self.max_iterations
        ))
    }

    async fn call_model(
        &self,
        conversation: &Conversation,
        tool_schemas: &[ToolSchema],
        events: Option<&EventSender>,
    ) -> anyhow::Result<ChatResponse> {
        let mut messages = Vec::with_capacity(conversation.messages.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(conversation.messages.iter().cloned());
        let tools = (!tool_schemas.is_empty()).then_some(tool_schemas);

        let Some(events) = events else {
            return self.llm.chat_completion(&self.model, &messages, tools).await;
        };

        let (delta_tx, mut delta_rx) = mpsc::unbounded_channel();
        let forward = async {
            while let Some(content) = delta_rx.recv().await {
                let _ = events.send(AgentEvent::Token { content });
            }
        };
        let (response, ()) = tokio::join!(
            self.llm
                .chat_completion_stream(&self.model, &messages, tools, delta_tx),
            forward
        );
        response
    }

    /// Execute a batch of tool calls and append their results.
    ///
    /// With `approved == false`, approval-gated calls are skipped and the
    /// model is told the user declined them.
    async fn execute_batch(
        &self,
        conversation: &mut Conversation,
        tool_calls: &[ToolCall],
        approved: bool,
        events: Option<&EventSender>,
    ) {
        for tool_call in tool_calls {
            let name = tool_call.function.name.as_str();
            let args = parse_arguments(&tool_call.function.arguments);

            if !approved && self.tools.requires_approval(name) {
                let declined = format!("The user declined to run {}.", name);
                emit(
                    events,
                    AgentEvent::ToolStart {
                        name: name.to_string(),
                        input: args,
                    },
                );
                emit(
                    events,
                    AgentEvent::ToolEnd {
                        name: name.to_string(),
                        output: declined.clone(),
                    },
                );
                conversation.push(ChatMessage::tool_result(&tool_call.id, declined));
                continue;
            }

            tracing::info!("Calling tool: {} with args: {}", name, tool_call.function.arguments);
            emit(
                events,
                AgentEvent::ToolStart {
                    name: name.to_string(),
                    input: args.clone(),
                },
            );

            let result_str = match self.tools.execute(name, args).await {
                Ok(output) => output,
                Err(e) => format!("Error: {:#}", e),
            };
            tracing::debug!("Tool {} returned: {}", name, truncate_for_log(&result_str, 1000));

            emit(
                events,
                AgentEvent::ToolEnd {
                    name: name.to_string(),
                    output: result_str.clone(),
                },
            );
            conversation.push(ChatMessage::tool_result(&tool_call.id, result_str));
        }
    }
}

fn emit(events: Option<&EventSender>, event: AgentEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or(Value::Null)
}

fn approval_requests(tool_calls: &[ToolCall], tools: &ToolRegistry) -> Vec<ApprovalRequest> {
    tool_calls
        .iter()
        .filter(|call| tools.requires_approval(&call.function.name))
        .map(|call| ApprovalRequest {
            tool_call_id: call.id.clone(),
            name: call.function.name.clone(),
            args: parse_arguments(&call.function.arguments),
            question: format!("Approve {}?", call.function.name.replace('_', " ")),
        })
        .collect()
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}... [truncated]", &s[..idx]),
    }
}
