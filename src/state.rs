// src/state.rs
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::Config;
use crate::services::completion::{CompletionClient, CompletionError};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    completion: OnceCell<CompletionClient>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self { config, completion: OnceCell::new() }
    }

    /// Completion client, built on first use and shared afterwards.
    ///
    /// Concurrent first callers wait on the same initialisation; a failed
    /// build leaves the cell empty so the next request tries again.
    pub async fn completion_client(&self) -> Result<&CompletionClient, CompletionError> {
        self.completion
            .get_or_try_init(|| async {
                tracing::info!(base_url = %self.config.openai_base_url, "Creating completion client");
                CompletionClient::new(
                    self.config.openai_api_key.as_deref(),
                    &self.config.openai_base_url,
                )
            })
            .await
    }

    /// Whether a request has built the client yet. Lets callers confirm the
    /// configuration check short-circuits before any client exists.
    pub fn completion_client_initialized(&self) -> bool {
        self.completion.initialized()
    }
}
