use std::sync::Arc;

use microwins_core::generation::{GenerationOptions, LanguageModel};
use microwins_core::store::TaskStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone. Handlers open a store session per operation; nothing
/// mutable is shared between requests.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend (PostgreSQL or in-memory).
    pub store: Arc<dyn TaskStore>,
    /// Language-model provider used for breakdown generation.
    pub llm: Arc<dyn LanguageModel>,
    pub config: Arc<ServerConfig>,
    /// Sampling parameters and timeout for every provider call.
    pub generation: GenerationOptions,
}
