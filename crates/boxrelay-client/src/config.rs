//! Client configuration

use crate::{Result, StorageError};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Size of one chunk read from the inbound stream (1 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Chunks forwarded in one request before it is checkpointed
pub const DEFAULT_CHECKPOINT_BATCH: u64 = 10;

/// Client configuration
///
/// The two base URLs and the access token have no defaults; everything else
/// can be tuned through the `with_*` builders.
#[derive(Clone)]
pub struct Config {
    /// RPC endpoint base, e.g. `https://api.dropboxapi.com/2/files`
    pub api_url: String,
    /// Content-upload endpoint base, e.g. `https://content.dropboxapi.com/2/files`
    pub content_url: String,
    /// Value sent verbatim in the `Authorization` header
    pub access_token: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Bytes per chunk
    pub chunk_size: usize,
    /// Chunks per request between checkpoints
    pub checkpoint_batch: u64,
}

impl Config {
    /// Create a config from the three required settings
    pub fn new(
        api_url: impl Into<String>,
        content_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            content_url: content_url.into(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(60 * 60),
            user_agent: format!("boxrelay-client/{}", env!("CARGO_PKG_VERSION")),
            chunk_size: DEFAULT_CHUNK_SIZE,
            checkpoint_batch: DEFAULT_CHECKPOINT_BATCH,
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set chunk size in bytes
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the number of chunks per request
    pub fn with_checkpoint_batch(mut self, batch: u64) -> Self {
        self.checkpoint_batch = batch;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check that the configuration can drive an upload
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("api_url", &self.api_url), ("content_url", &self.content_url)] {
            Url::parse(value)
                .map_err(|e| StorageError::Config(format!("{} {:?} is not a valid URL: {}", name, value, e)))?;
        }
        if self.access_token.trim().is_empty() {
            return Err(StorageError::Config("access_token must not be empty".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(StorageError::Config("chunk_size must be positive".to_string()));
        }
        if self.checkpoint_batch == 0 {
            return Err(StorageError::Config("checkpoint_batch must be positive".to_string()));
        }
        Ok(())
    }

    /// URL of an RPC endpoint
    pub fn api_endpoint(&self, route: &str) -> String {
        join(&self.api_url, route)
    }

    /// URL of a content-upload endpoint
    pub fn content_endpoint(&self, route: &str) -> String {
        join(&self.content_url, route)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("content_url", &self.content_url)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("chunk_size", &self.chunk_size)
            .field("checkpoint_batch", &self.checkpoint_batch)
            .finish()
    }
}

fn join(base: &str, route: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), route.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            "https://api.example.com/2/files/",
            "https://content.example.com/2/files",
            "Bearer token",
        )
    }

    #[test]
    fn test_endpoints_join_without_double_slash() {
        let config = config();
        assert_eq!(
            config.api_endpoint("get_temporary_link"),
            "https://api.example.com/2/files/get_temporary_link"
        );
        assert_eq!(
            config.content_endpoint("/upload_session/start"),
            "https://content.example.com/2/files/upload_session/start"
        );
    }

    #[test]
    fn test_validate() {
        assert!(config().validate().is_ok());
        assert!(config().with_chunk_size(0).validate().is_err());
        assert!(config().with_checkpoint_batch(0).validate().is_err());

        let mut bad = config();
        bad.content_url = "not a url".to_string();
        assert!(matches!(bad.validate(), Err(StorageError::Config(_))));

        let mut no_token = config();
        no_token.access_token = " ".to_string();
        assert!(no_token.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("Bearer token"));
        assert!(rendered.contains("<redacted>"));
    }
}
