use crate::{
    api::ApiClient,
    config::AppConfig,
    session::{FileStorage, SessionStore},
};
use anyhow::{Context, Result};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: AppConfig,
    pub json: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            json: false,
        }
    }

    /// Opens the file-backed session store and hydrates it.
    #[must_use]
    pub fn session_store(&self) -> SessionStore<FileStorage> {
        SessionStore::open(FileStorage::new(&self.config.state_dir))
    }

    /// # Errors
    /// Returns an error if the configured API endpoint is unusable.
    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::from_config(&self.config).context("failed to create API client")
    }
}
