//! Shopping assistant - chat server entry point.
//!
//! Serves `/chat` and `/chat/stream`; the assistant's tools call the store
//! API at `BACKEND_URL`.

use std::sync::Arc;

use storefront::agent::shopping_agent;
use storefront::api::{self, ChatState};
use storefront::config::{Config, LlmConfig};
use storefront::llm::OpenAiClient;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront::init_tracing("storefront=debug,tower_http=debug");

    let config = Config::from_env(8001)?;
    let llm_config = LlmConfig::from_env()?;
    info!(
        "Loaded configuration: model={} backend={} checkout_approval={}",
        llm_config.model, config.backend_url, config.checkout_approval
    );

    let llm = Arc::new(OpenAiClient::new(&llm_config)?);
    let agent = shopping_agent(llm, &llm_config.model, &config);

    let addr = config.bind_addr();
    info!("Starting shopping assistant on {}", addr);
    api::serve(&addr, api::shopping_router(ChatState::new(agent))).await
}
