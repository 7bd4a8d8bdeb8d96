//! Ready-made agents.

use std::sync::Arc;

use crate::config::Config;
use crate::llm::LlmClient;
use crate::tools::{ShopClient, ToolRegistry};

use super::agent_loop::Agent;
use super::prompt::{build_shopping_prompt, MATH_PROMPT};

/// Shopping assistant whose tools call the store at `config.backend_url`.
pub fn shopping_agent(llm: Arc<dyn LlmClient>, model: &str, config: &Config) -> Agent {
    let tools = ToolRegistry::shopping(ShopClient::new(config.backend_url.clone()));
    let prompt = build_shopping_prompt(&config.frontend_url, &tools);
    Agent::new(llm, tools, model, prompt)
        .with_max_iterations(config.max_iterations)
        .with_approval(config.checkout_approval)
}

pub fn math_agent(llm: Arc<dyn LlmClient>, model: &str, config: &Config) -> Agent {
    Agent::new(llm, ToolRegistry::math(), model, MATH_PROMPT)
        .with_max_iterations(config.max_iterations)
}
