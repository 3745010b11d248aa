//! Storage error types

use serde_json::Value;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage errors
///
/// Every variant carries a stable numeric code (see [`StorageError::code`])
/// that callers can map onto their own error envelopes.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The inbound multipart field could not be obtained
    #[error("Can't get file part from multipart: {0}")]
    MultipartExtraction(String),

    /// Fewer or more bytes reached the storage service than were declared
    #[error("Not whole file stored: declared {expected} bytes, forwarded {written}")]
    IncompleteUpload {
        expected: u64,
        written: u64,
        #[source]
        cause: Option<Box<StorageError>>,
    },

    /// Reading the inbound file stream failed
    #[error("Can't read inbound file stream: {0}")]
    InboundRead(#[source] std::io::Error),

    /// The service never assigned an upload session id
    #[error("Cloud storage did not assign an upload session")]
    MissingSession,

    /// Request could not be sent or its body could not be written
    #[error("Can't write to cloud storage: {0}")]
    Write(String),

    /// Connection could not be established
    #[error("Can't establish connection with cloud storage: {0}")]
    Connect(String),

    /// Non-200 response
    #[error("Error in response = {status} message = {message}")]
    Status {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Response could not be read or parsed
    #[error("Can not read response from cloud storage: {0}")]
    Read(String),

    /// The service reported an `error_summary`
    #[error("Error downloading file {0}")]
    Remote(String),

    /// The committed object carries no path reference
    #[error("File not exists")]
    FileNotFound,

    /// Content hash on the server differs from the one recorded at upload
    #[error("File was modified after upload")]
    FileModified {
        expected: Option<String>,
        actual: Option<String>,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StorageError {
    pub const MULTIPART_EXTRACTION: u32 = 30000;
    pub const INCOMPLETE_UPLOAD: u32 = 30001;
    pub const INBOUND_READ: u32 = 30002;
    pub const MISSING_SESSION: u32 = 30003;
    pub const WRITE: u32 = 30004;
    pub const CONNECT: u32 = 30005;
    pub const STATUS: u32 = 30006;
    pub const READ: u32 = 30007;
    pub const REMOTE: u32 = 30008;
    pub const FILE_NOT_FOUND: u32 = 30009;
    pub const FILE_MODIFIED: u32 = 30010;
    pub const CONFIG: u32 = 30011;

    /// Stable machine-readable code
    pub fn code(&self) -> u32 {
        match self {
            Self::MultipartExtraction(_) => Self::MULTIPART_EXTRACTION,
            Self::IncompleteUpload { .. } => Self::INCOMPLETE_UPLOAD,
            Self::InboundRead(_) => Self::INBOUND_READ,
            Self::MissingSession => Self::MISSING_SESSION,
            Self::Write(_) => Self::WRITE,
            Self::Connect(_) => Self::CONNECT,
            Self::Status { .. } => Self::STATUS,
            Self::Read(_) => Self::READ,
            Self::Remote(_) => Self::REMOTE,
            Self::FileNotFound => Self::FILE_NOT_FOUND,
            Self::FileModified { .. } => Self::FILE_MODIFIED,
            Self::Config(_) => Self::CONFIG,
        }
    }

    /// HTTP status of the remote response behind this error, if any
    ///
    /// Looks through an incomplete upload to the step that aborted it.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::IncompleteUpload { cause: Some(cause), .. } => cause.status(),
            _ => None,
        }
    }

    /// Whether the failure originated at the storage service or on the way to it
    pub fn is_upstream(&self) -> bool {
        match self {
            Self::MissingSession
            | Self::Write(_)
            | Self::Connect(_)
            | Self::Status { .. }
            | Self::Read(_)
            | Self::Remote(_) => true,
            Self::IncompleteUpload { cause: Some(cause), .. } => cause.is_upstream(),
            _ => false,
        }
    }

    /// Build the error for a non-200 response
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &[u8]) -> Self {
        let json = serde_json::from_slice::<Value>(body).ok();
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        let message = match &json {
            Some(value) => match value.get("error_summary").and_then(Value::as_str) {
                Some(summary) => format!("{}: {}", reason, summary),
                None => reason,
            },
            None => {
                let text = String::from_utf8_lossy(body);
                let text = text.trim();
                if text.is_empty() {
                    reason
                } else {
                    format!("{}: {}", reason, text.chars().take(200).collect::<String>())
                }
            }
        };

        Self::Status {
            status: status.as_u16(),
            message,
            body: json,
        }
    }

    /// Map a failed `send` onto the taxonomy
    pub(crate) fn from_send(error: reqwest::Error) -> Self {
        if error.is_connect() {
            Self::Connect(error.to_string())
        } else {
            Self::Write(error.to_string())
        }
    }
}
