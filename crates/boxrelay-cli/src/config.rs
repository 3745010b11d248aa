//! Gateway configuration

use boxrelay_client::{Config, DEFAULT_CHECKPOINT_BATCH, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Dropbox RPC endpoint base
    pub api_url: String,
    /// Dropbox content-upload endpoint base
    pub content_url: String,
    /// Authorization header value for Dropbox
    #[serde(default, skip_serializing)]
    pub access_token: String,
    /// Bytes per forwarded chunk
    pub chunk_size: usize,
    /// Chunks per request between checkpoints
    pub checkpoint_batch: u64,
    /// Outbound request timeout (seconds)
    pub request_timeout_secs: u64,
    /// Maximum inbound request body size (bytes)
    pub max_upload_size: u64,
    /// Enable CORS
    pub cors_enabled: bool,
}

impl GatewayConfig {
    /// Create a config from the required Dropbox settings
    pub fn new(
        api_url: impl Into<String>,
        content_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_url: api_url.into(),
            content_url: content_url.into(),
            access_token: access_token.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            checkpoint_batch: DEFAULT_CHECKPOINT_BATCH,
            request_timeout_secs: 60 * 60, // 1 hour
            max_upload_size: 50 * 1024 * 1024 * 1024, // 50 GB
            cors_enabled: true,
        }
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Client configuration for the storage service
    pub fn storage_config(&self) -> Config {
        Config::new(&self.api_url, &self.content_url, &self.access_token)
            .with_chunk_size(self.chunk_size)
            .with_checkpoint_batch(self.checkpoint_batch)
            .with_timeout(Duration::from_secs(self.request_timeout_secs))
    }
}
