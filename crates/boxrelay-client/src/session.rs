//! Chunked upload session
//!
//! ```text
//! start ──chunk──chunk── … ──checkpoint──▶ append_v2 ──chunk── … ──checkpoint──▶ finish
//!         (batch of N chunks per request)      (cursor = session id + offset)
//! ```
//!
//! The first request opens the session and the service answers it with a
//! session id. Every `checkpoint_batch` chunks the open request is drained and
//! a new `append_v2` request is opened at the current offset, so no single
//! request body grows without bound.

use crate::transport::{self, Connection, Payload, Transport};
use crate::{CommitInfo, Config, Result, StorageError};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const START_ROUTE: &str = "upload_session/start";
const APPEND_ROUTE: &str = "upload_session/append_v2";
const FINISH_ROUTE: &str = "upload_session/finish";

#[derive(Serialize)]
struct StartArg {
    close: bool,
}

#[derive(Serialize)]
struct Cursor<'a> {
    session_id: &'a str,
    offset: u64,
}

#[derive(Serialize)]
struct AppendArg<'a> {
    close: bool,
    cursor: Cursor<'a>,
}

#[derive(Serialize)]
struct FinishArg<'a> {
    cursor: Cursor<'a>,
    commit: &'a CommitInfo,
}

/// State of one chunked upload
pub struct UploadSession<'a> {
    transport: &'a Transport,
    config: &'a Config,
    content_type: String,
    session_id: Option<String>,
    offset: u64,
    chunks: u64,
    pending: Option<Connection>,
}

impl<'a> UploadSession<'a> {
    /// Open the `start` request
    pub fn start(
        transport: &'a Transport,
        config: &'a Config,
        content_type: impl Into<String>,
    ) -> Result<Self> {
        let content_type = content_type.into();
        let pending = transport.send(
            &config.content_endpoint(START_ROUTE),
            &content_type,
            &StartArg { close: false },
            Payload::Header,
        )?;

        Ok(Self {
            transport,
            config,
            content_type,
            session_id: None,
            offset: 0,
            chunks: 0,
            pending: Some(pending),
        })
    }

    /// Session id assigned by the service, once known
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Bytes accepted into request bodies so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Chunks forwarded so far
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// Forward one chunk into the open request
    ///
    /// Every `checkpoint_batch`-th chunk drains the request and opens the next
    /// `append_v2` request at the new offset.
    pub async fn append(&mut self, chunk: Bytes) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        let Some(connection) = self.pending.as_mut() else {
            return Err(StorageError::Write("upload session has no open request".to_string()));
        };

        let len = chunk.len() as u64;
        if let Err(e) = connection.write(chunk).await {
            self.pending = None;
            return Err(e);
        }
        self.offset += len;
        self.chunks += 1;

        if self.chunks % self.config.checkpoint_batch == 0 {
            self.checkpoint().await?;
            self.open_append()?;
        }
        Ok(())
    }

    /// Drain the open request and pick up the session id from its response
    ///
    /// Keeps the previously known id when the response has none. A session
    /// with no open request checkpoints to the id it already has.
    pub async fn checkpoint(&mut self) -> Result<Option<&str>> {
        let response = transport::drain(self.pending.take()).await?;
        if let Some(id) = response.get("session_id").and_then(Value::as_str) {
            self.session_id = Some(id.to_string());
        }

        debug!(
            session_id = ?self.session_id,
            offset = self.offset,
            chunks = self.chunks,
            "Upload session checkpoint"
        );
        Ok(self.session_id.as_deref())
    }

    fn open_append(&mut self) -> Result<()> {
        let session_id = self.session_id.as_deref().ok_or(StorageError::MissingSession)?;
        let arg = AppendArg {
            close: false,
            cursor: Cursor {
                session_id,
                offset: self.offset,
            },
        };
        let connection = self.transport.send(
            &self.config.content_endpoint(APPEND_ROUTE),
            &self.content_type,
            &arg,
            Payload::Header,
        )?;
        self.pending = Some(connection);
        Ok(())
    }

    /// Commit the session and return the service's file metadata
    pub async fn finish(mut self, commit: &CommitInfo) -> Result<Value> {
        self.checkpoint().await?;
        let session_id = self.session_id.as_deref().ok_or(StorageError::MissingSession)?;
        let arg = FinishArg {
            cursor: Cursor {
                session_id,
                offset: self.offset,
            },
            commit,
        };

        debug!(session_id, offset = self.offset, path = %commit.path, "Finishing upload session");
        let connection = self.transport.send(
            &self.config.content_endpoint(FINISH_ROUTE),
            &self.content_type,
            &arg,
            Payload::Header,
        )?;
        transport::drain(Some(connection)).await
    }
}
