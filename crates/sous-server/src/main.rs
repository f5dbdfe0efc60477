mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sous::recipes::store::RecipeStore;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::configuration::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let Settings {
        server,
        provider,
        storage,
        agent,
    } = Settings::new()?;

    // The store file is created on first use.
    let store = RecipeStore::open(&storage.path)
        .with_context(|| format!("opening recipe store at {:?}", storage.path))?;
    info!("recipe store at {:?}", storage.path);

    let state = AppState {
        provider_config: provider.into_config(),
        store: Arc::new(store),
        max_tool_rounds: agent.max_tool_rounds,
        dispatch_timeout: Duration::from_secs(agent.dispatch_timeout_secs),
    };

    // The static chat page is served elsewhere; allow it to call us.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(server.socket_addr()).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
