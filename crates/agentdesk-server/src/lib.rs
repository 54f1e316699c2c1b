pub mod config;
mod proxy;
mod routes;
pub mod store;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

pub use proxy::Upstream;
pub use routes::{build_router, AppState, InnerAppState};

use config::ServerConfig;
use store::MemoryStore;

/// Assemble shared state from configuration, loading the seed file if one is given.
pub fn build_state(config: &ServerConfig) -> Result<AppState> {
    let store = match &config.seed {
        Some(path) => MemoryStore::from_json_file(path)?,
        None => MemoryStore::seeded(),
    };
    let upstream = config.upstream_url.as_deref().map(Upstream::new);
    Ok(InnerAppState::new(&config.public_url(), upstream, store))
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    match &state.upstream {
        Some(upstream) => info!("forwarding unhandled requests to {}", upstream.base_url()),
        None => info!("serving the in-memory backend"),
    }
    let app = build_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
