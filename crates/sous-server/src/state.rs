use std::sync::Arc;
use std::time::Duration;

use sous::providers::configs::OllamaProviderConfig;
use sous::recipes::store::RecipeStore;

/// Shared application state. Each request builds its own agent from this,
/// so concurrent orchestration runs share nothing but the store, which
/// serializes its own writes.
#[derive(Clone)]
pub struct AppState {
    pub provider_config: OllamaProviderConfig,
    pub store: Arc<RecipeStore>,
    pub max_tool_rounds: usize,
    pub dispatch_timeout: Duration,
}
