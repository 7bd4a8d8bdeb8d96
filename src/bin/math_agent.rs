//! Arithmetic agent - HTTP entry point.

use std::sync::Arc;

use storefront::agent::math_agent;
use storefront::api;
use storefront::config::{Config, LlmConfig};
use storefront::llm::OpenAiClient;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront::init_tracing("storefront=debug,tower_http=debug");

    let config = Config::from_env(8001)?;
    let llm_config = LlmConfig::from_env()?;
    info!("Loaded configuration: model={}", llm_config.model);

    let llm = Arc::new(OpenAiClient::new(&llm_config)?);
    let agent = Arc::new(math_agent(llm, &llm_config.model, &config));

    let addr = config.bind_addr();
    info!("Starting math agent on {}", addr);
    api::serve(&addr, api::math_router(agent)).await
}
