//! Common types for the client SDK

use crate::{Result, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Content type used when the inbound part does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension given to generated file names
pub const UNKNOWN_EXTENSION: &str = "unk";

/// An inbound file as handed over by the hosting request layer
#[derive(Debug)]
pub struct FilePart<R> {
    /// Declared content type
    pub content_type: Option<String>,
    /// Filename submitted by the client
    pub file_name: Option<String>,
    /// Total byte length the stream is expected to yield
    pub declared_size: u64,
    /// File bytes
    pub reader: R,
}

impl<R> FilePart<R> {
    /// Create a part with no content type or filename
    pub fn new(reader: R, declared_size: u64) -> Self {
        Self {
            content_type: None,
            file_name: None,
            declared_size,
            reader,
        }
    }

    /// Set content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set filename
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

/// Where and how an upload session is committed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Target path
    pub path: String,
    /// Write mode
    pub mode: String,
    pub autorename: bool,
    pub mute: bool,
    pub strict_conflict: bool,
}

impl CommitInfo {
    /// Commit under a fresh `/<uuid>_<file_name>` path
    pub fn for_file(file_name: &str) -> Self {
        Self {
            path: format!("/{}_{}", Uuid::new_v4(), file_name),
            mode: "add".to_string(),
            autorename: true,
            mute: false,
            strict_conflict: false,
        }
    }
}

/// Metadata of a committed upload, plus the original `filename`
///
/// Kept as a JSON object so every field the service returns survives a round
/// trip through the caller's storage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommittedObject(Map<String, Value>);

impl CommittedObject {
    /// Attach `filename` to a finish response
    pub fn from_finish(response: Value, file_name: &str) -> Result<Self> {
        let mut fields = match response {
            Value::Object(fields) => fields,
            other => {
                return Err(StorageError::Read(format!(
                    "finish response is not a JSON object: {}",
                    other
                )))
            }
        };
        fields.insert("filename".to_string(), Value::String(file_name.to_string()));
        Ok(Self(fields))
    }

    /// Server-side path, if present and non-empty
    pub fn path_display(&self) -> Option<&str> {
        self.0
            .get("path_display")
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
    }

    /// Content hash recorded at upload time
    ///
    /// Looks at the top-level `content_hash` first, then `metadata.content_hash`.
    pub fn content_hash(&self) -> Option<&str> {
        self.0
            .get("content_hash")
            .and_then(Value::as_str)
            .or_else(|| {
                self.0
                    .get("metadata")
                    .and_then(|metadata| metadata.get("content_hash"))
                    .and_then(Value::as_str)
            })
    }

    /// Original filename
    pub fn filename(&self) -> Option<&str> {
        self.0.get("filename").and_then(Value::as_str)
    }

    /// Raw field access
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Unwrap into the underlying JSON object
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for CommittedObject {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A verified temporary download link
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryLink {
    /// Short-lived URL
    pub link: String,
    /// Content hash the link was validated against
    pub content_hash: String,
}
