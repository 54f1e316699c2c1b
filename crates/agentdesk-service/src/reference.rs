use std::sync::Arc;

use agentdesk_core::reference::ReferenceData;
use tokio::sync::{watch, OnceCell};
use tracing::{error, info};

use crate::AgentApi;

pub const REFERENCE_LOAD_ERROR: &str = "Failed to load reference data. Please try refreshing.";

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceState {
    pub data: ReferenceData,
    /// True until all four lists have resolved or one has failed.
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ReferenceState {
    fn default() -> Self {
        Self {
            data: ReferenceData::default(),
            loading: true,
            error: None,
        }
    }
}

/// Fetches languages, voices, prompts and models once, concurrently.
pub struct ReferenceLoader {
    api: Arc<dyn AgentApi>,
    state: watch::Sender<ReferenceState>,
    loaded: OnceCell<()>,
}

impl ReferenceLoader {
    pub fn new(api: Arc<dyn AgentApi>) -> Self {
        let (state, _) = watch::channel(ReferenceState::default());
        Self {
            api,
            state,
            loaded: OnceCell::new(),
        }
    }

    pub fn state(&self) -> ReferenceState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ReferenceState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Load on first call; later calls return the settled state without refetching.
    /// Concurrent first calls share a single fetch.
    pub async fn load(&self) -> ReferenceState {
        self.loaded.get_or_init(|| self.fetch()).await;
        self.state()
    }

    async fn fetch(&self) {
        let api = self.api.as_ref();
        let result = tokio::try_join!(
            api.list_languages(),
            api.list_voices(),
            api.list_prompts(),
            api.list_models(),
        );

        self.state.send_modify(|state| {
            match result {
                Ok((languages, voices, prompts, models)) => {
                    info!(
                        "loaded reference data: {} languages, {} voices, {} prompts, {} models",
                        languages.len(),
                        voices.len(),
                        prompts.len(),
                        models.len()
                    );
                    state.data = ReferenceData {
                        languages,
                        voices,
                        prompts,
                        models,
                    };
                }
                Err(e) => {
                    error!("failed to load reference data: {e}");
                    state.error = Some(REFERENCE_LOAD_ERROR.to_string());
                }
            }
            state.loading = false;
        });
    }
}
