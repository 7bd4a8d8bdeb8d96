//! Offline client that replays canned responses in order.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ChatMessage, ChatResponse, LlmClient, ToolCall, ToolSchema};

#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A plain text reply.
    pub fn reply(content: impl Into<String>) -> ChatResponse {
        ChatResponse {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// A reply requesting a single tool call, with optional narration.
    pub fn call(
        narration: Option<&str>,
        id: &str,
        name: &str,
        arguments: Value,
    ) -> ChatResponse {
        ChatResponse {
            content: narration.map(str::to_string),
            tool_calls: Some(vec![ToolCall::new(id, name, arguments)]),
        }
    }

    /// Every message list the client has been asked to complete.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn chat_completion(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        _tools: Option<&[ToolSchema]>,
    ) -> anyhow::Result<ChatResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        self.responses
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted client lock poisoned"))?
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("scripted client ran out of responses"))
    }
}
