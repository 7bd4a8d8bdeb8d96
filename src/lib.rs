//! # Storefront
//!
//! A demo e-commerce backend with tool-calling assistants.
//!
//! This library provides:
//! - An in-memory store (products, cart, orders, mock payments) and its HTTP API
//! - A shopping assistant that uses the store API as tools, with server-side
//!   threads and a human approval step before checkout
//! - A small arithmetic agent
//!
//! ## Architecture
//!
//! The agents follow the "tools in a loop" pattern:
//! 1. Receive a message via the API (or the terminal client)
//! 2. Call the LLM with the thread's history and the available tools
//! 3. Execute any tool calls and feed the results back
//! 4. Repeat until the LLM answers, pausing when a tool needs approval
//!
//! ## Example
//!
//! ```rust,ignore
//! use storefront::{api, store::Database};
//!
//! let db = Database::new();
//! api::serve("127.0.0.1:8000", api::store_router(db)).await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod store;
pub mod tools;

pub use config::Config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the fmt subscriber, filtered by `RUST_LOG` or `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let default_filter = default_filter.to_string();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
