//! Tools the agents can call.
//!
//! Each tool advertises a JSON schema for its arguments and returns plain
//! text for the model to read. Failures are returned as errors and turned
//! into readable `Error: ...` messages by the agent loop.

mod math;
mod shop;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{FunctionSchema, ToolSchema};

pub use math::{Add, Divide, Multiply};
pub use shop::{
    format_cents, AddToCart, Checkout, GetProductDetails, ListCategories, Pay, SearchProducts,
    ShopClient, ViewCart,
};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    /// Whether the agent must pause for the user's approval before running
    /// this tool.
    fn requires_approval(&self) -> bool {
        false
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Name and description, for prompts and listings.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Static table of tools, looked up by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, so schemas and prompts are stable.
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tools for the shopping assistant, backed by the store API.
    pub fn shopping(client: ShopClient) -> Self {
        let mut registry = Self::new();
        registry.register(SearchProducts::new(client.clone()));
        registry.register(GetProductDetails::new(client.clone()));
        registry.register(AddToCart::new(client.clone()));
        registry.register(ViewCart::new(client.clone()));
        registry.register(Checkout::new(client.clone()));
        registry.register(ListCategories::new(client.clone()));
        registry.register(Pay::new(client));
        registry
    }

    /// Arithmetic tools for the math agent.
    pub fn math() -> Self {
        let mut registry = Self::new();
        registry.register(Add);
        registry.register(Multiply);
        registry.register(Divide);
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.ordered()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Schemas in the shape the chat completions API expects.
    pub fn get_tool_schemas(&self) -> Vec<ToolSchema> {
        self.ordered()
            .map(|t| ToolSchema {
                tool_type: "function".to_string(),
                function: FunctionSchema {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters_schema(),
                },
            })
            .collect()
    }

    pub fn requires_approval(&self, name: &str) -> bool {
        self.tools
            .get(name)
            .map(|t| t.requires_approval())
            .unwrap_or(false)
    }

    pub async fn execute(&self, name: &str, args: Value) -> anyhow::Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Tool {} not found.", name))?;
        tool.execute(args).await
    }

    fn ordered(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }
}
