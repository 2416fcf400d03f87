mod game;
mod pool;
mod round;
mod session;

pub use game::{GuessOutcome, NewGame, NewSynopsis};
pub use pool::pick_unplayed;
pub use round::{GuessApplied, UNKNOWN_TITLE};
pub use session::{LoadedSession, SessionStore};

use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::llm::{LlmConfig, LlmManager};
use std::sync::Arc;

/// Shared application state.
///
/// Reference data and the generative service are immutable after startup;
/// the only mutable part is the session store.
#[derive(Clone)]
pub struct AppState {
    pub config: GameConfig,
    pub catalog: Arc<Catalog>,
    /// None when no generative provider is configured
    pub llm: Option<Arc<LlmManager>>,
    pub llm_config: LlmConfig,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        config: GameConfig,
        catalog: Catalog,
        llm: Option<LlmManager>,
        llm_config: LlmConfig,
    ) -> Self {
        let sessions = SessionStore::new(config.session_ttl, config.max_sessions);
        Self {
            config,
            catalog: Arc::new(catalog),
            llm: llm.map(Arc::new),
            llm_config,
            sessions,
        }
    }

    pub fn ai_enabled(&self) -> bool {
        self.llm.is_some()
    }
}
