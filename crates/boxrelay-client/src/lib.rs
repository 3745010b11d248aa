//! # boxrelay client
//!
//! Streams a file into the Dropbox upload session API without holding it in
//! memory, and hands out temporary links that are checked against the content
//! hash recorded at upload time.
//!
//! ## Features
//!
//! - **Streaming**: fixed-size chunks flow straight from the inbound reader into
//!   open request bodies
//! - **Checkpoints**: every `checkpoint_batch` chunks the request is committed
//!   and a new `append_v2` request continues at the current offset
//! - **Integrity**: byte counts must match the declared size, and links are
//!   only returned for unmodified content
//!
//! ## Example
//!
//! ```rust,ignore
//! use boxrelay_client::{Config, DropboxStorage, FilePart};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let storage = DropboxStorage::new(Config::new(
//!         "https://api.dropboxapi.com/2/files",
//!         "https://content.dropboxapi.com/2/files",
//!         "Bearer <token>",
//!     ))?;
//!
//!     let file = tokio::fs::File::open("video.mp4").await?;
//!     let size = file.metadata().await?.len();
//!     let part = FilePart::new(file, size)
//!         .with_file_name("video.mp4")
//!         .with_content_type("video/mp4");
//!
//!     let object = storage.upload(part).await?;
//!     let link = storage.get_link(&object).await?;
//!     println!("{}", link);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod integrity;
mod link;
mod session;
mod transport;
mod types;

pub use client::DropboxStorage;
pub use config::{Config, DEFAULT_CHECKPOINT_BATCH, DEFAULT_CHUNK_SIZE};
pub use error::{Result, StorageError};
pub use integrity::verify;
pub use link::LinkResolver;
pub use session::UploadSession;
pub use transport::{drain, header_safe_json, Connection, Payload, Transport, API_ARG_HEADER};
pub use types::*;
