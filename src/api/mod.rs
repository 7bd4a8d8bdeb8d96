//! HTTP API: the store endpoints and the agent chat endpoints.

mod chat;
mod error;
mod routes;
mod types;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

pub use chat::{math_router, shopping_router, ChatState};
pub use error::{ApiError, ErrorResponse};
pub use routes::store_router;
pub use types::*;

/// Bind `addr` and serve `app` until the process exits.
pub async fn serve(addr: &str, app: Router) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local: SocketAddr = listener.local_addr()?;
    tracing::info!("Listening on http://{}", local);
    axum::serve(listener, app).await?;
    Ok(())
}
