//! Storefront - store API entry point.
//!
//! Seeds the in-memory catalog and serves the store endpoints.

use rand::rngs::StdRng;
use rand::SeedableRng;
use storefront::{api, config::Config, store::seed, store::Database};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront::init_tracing("storefront=debug,tower_http=debug");

    let config = Config::from_env(8000)?;
    info!(
        "Loaded configuration: seed_products={}",
        config.seed_products
    );

    let db = Database::new();
    let mut rng = StdRng::from_entropy();
    seed::seed_catalog(&db, config.seed_products, &mut rng).await?;

    let addr = config.bind_addr();
    info!("Starting store API on {}", addr);
    api::serve(&addr, api::store_router(db)).await
}
