//! OpenAI-compatible chat completions client (OpenAI, OpenRouter, Azure OpenAI).

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use super::{ChatMessage, ChatResponse, FunctionCall, LlmClient, ToolCall, ToolSchema};
use crate::config::{LlmConfig, LlmProvider};

pub struct OpenAiClient {
    http: reqwest::Client,
    provider: LlmProvider,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            provider: config.provider.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn completions_url(&self) -> String {
        match &self.provider {
            LlmProvider::OpenAi { base_url } => format!("{}/chat/completions", base_url),
            LlmProvider::Azure {
                endpoint,
                deployment,
                api_version,
            } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                endpoint, deployment, api_version
            ),
        }
    }

    fn request(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        stream: bool,
    ) -> reqwest::RequestBuilder {
        let mut payload = json!({
            "model": model,
            "messages": messages,
            "stream": stream,
        });
        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            payload["tools"] = json!(tools);
            payload["tool_choice"] = json!("auto");
        }

        let builder = self.http.post(self.completions_url()).json(&payload);
        match self.provider {
            LlmProvider::OpenAi { .. } => builder.bearer_auth(&self.api_key),
            LlmProvider::Azure { .. } => builder.header("api-key", &self.api_key),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> anyhow::Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("LLM request failed: {}", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "LLM request failed with {}: {}",
                status,
                body
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> anyhow::Result<ChatResponse> {
        let response = self
            .send(self.request(model, messages, tools, false))
            .await?;
        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse LLM response: {}", e))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("LLM returned no choices"))?;

        Ok(ChatResponse {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.filter(|calls| !calls.is_empty()),
        })
    }

    async fn chat_completion_stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
        deltas: mpsc::UnboundedSender<String>,
    ) -> anyhow::Result<ChatResponse> {
        let response = self.send(self.request(model, messages, tools, true)).await?;

        let mut accumulator = StreamAccumulator::default();
        let mut buf: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| anyhow::anyhow!("LLM stream error: {}", e))?;
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                if let Some(delta) = accumulator.push_line(&line)? {
                    let _ = deltas.send(delta);
                }
            }
        }

        if !buf.is_empty() {
            let line = String::from_utf8_lossy(&buf).to_string();
            if let Some(delta) = accumulator.push_line(&line)? {
                let _ = deltas.send(delta);
            }
        }

        Ok(accumulator.finish())
    }
}

/// Assembles a streamed completion from SSE `data:` lines.
#[derive(Debug, Default)]
pub(crate) struct StreamAccumulator {
    content: String,
    tool_calls: BTreeMap<usize, PartialToolCall>,
    done: bool,
}

#[derive(Debug, Default)]
struct PartialToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

impl StreamAccumulator {
    /// Feed one line; returns the content delta it carried, if any.
    pub(crate) fn push_line(&mut self, line: &str) -> anyhow::Result<Option<String>> {
        let line = line.trim();
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(None);
        };
        let data = data.trim();
        if data == "[DONE]" {
            self.done = true;
            return Ok(None);
        }
        if data.is_empty() || self.done {
            return Ok(None);
        }

        let chunk: StreamChunk = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse LLM stream chunk `{}`: {}", data, e))?;

        let mut delta_text = String::new();
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                delta_text.push_str(&content);
            }
            for call in choice.delta.tool_calls.unwrap_or_default() {
                let index = call.index.unwrap_or(self.tool_calls.len());
                let partial = self.tool_calls.entry(index).or_default();
                if let Some(id) = call.id {
                    partial.id = Some(id);
                }
                if let Some(function) = call.function {
                    if let Some(name) = function.name {
                        partial.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        partial.arguments.push_str(&arguments);
                    }
                }
            }
        }

        if delta_text.is_empty() {
            return Ok(None);
        }
        self.content.push_str(&delta_text);
        Ok(Some(delta_text))
    }

    pub(crate) fn finish(self) -> ChatResponse {
        let tool_calls: Vec<ToolCall> = self
            .tool_calls
            .into_iter()
            .filter(|(_, partial)| !partial.name.is_empty())
            .map(|(index, partial)| ToolCall {
                id: partial.id.unwrap_or_else(|| format!("call_{}", index)),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: partial.name,
                    arguments: if partial.arguments.is_empty() {
                        "{}".to_string()
                    } else {
                        partial.arguments
                    },
                },
            })
            .collect();

        ChatResponse {
            content: (!self.content.is_empty()).then_some(self.content),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}
