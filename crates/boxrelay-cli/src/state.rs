//! Application state

use crate::config::GatewayConfig;
use boxrelay_client::DropboxStorage;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Storage client
    pub storage: DropboxStorage,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let storage = DropboxStorage::new(config.storage_config())?;
        info!(
            content_url = %config.content_url,
            chunk_size = config.chunk_size,
            checkpoint_batch = config.checkpoint_batch,
            "Storage client ready"
        );

        Ok(Self { config, storage })
    }
}
