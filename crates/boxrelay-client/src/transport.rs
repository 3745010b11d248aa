//! Outbound HTTP transport
//!
//! A [`Connection`] is one in-flight POST. In header mode its JSON argument
//! travels in the `Dropbox-API-Arg` header and the body stays open for
//! streaming binary data until the connection is drained. In body mode the
//! JSON argument is the whole request body.

use crate::{Config, Result, StorageError};
use bytes::Bytes;
use futures::stream;
use reqwest::{header, Client, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

/// Header carrying the JSON argument of content-upload endpoints
pub const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Chunks that may queue between the reader and an in-flight request body
const BODY_QUEUE_DEPTH: usize = 2;

/// Where the JSON payload of a request travels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload {
    /// In the `Dropbox-API-Arg` header, body reserved for file bytes
    Header,
    /// As the request body
    Body,
}

/// HTTP transport to the storage service
#[derive(Clone)]
pub struct Transport {
    http: Client,
    access_token: String,
}

impl Transport {
    /// Create a transport from the client configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| StorageError::Config(format!("can't build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            access_token: config.access_token.clone(),
        })
    }

    /// Open a POST request to `url`
    ///
    /// The exchange starts immediately in the background; read its outcome
    /// with [`drain`].
    pub fn send<T: Serialize + ?Sized>(
        &self,
        url: &str,
        content_type: &str,
        payload: &T,
        mode: Payload,
    ) -> Result<Connection> {
        let request = self
            .http
            .post(url)
            .header(header::AUTHORIZATION, self.access_token.as_str())
            .header(header::CONTENT_TYPE, content_type);

        let (request, body) = match mode {
            Payload::Header => {
                let arg = header_safe_json(payload)
                    .map_err(|e| StorageError::Write(format!("can't encode request argument: {}", e)))?;
                let (tx, rx) = mpsc::channel::<std::io::Result<Bytes>>(BODY_QUEUE_DEPTH);
                let chunks = stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|chunk| (chunk, rx))
                });
                let request = request
                    .header(API_ARG_HEADER, arg)
                    .body(reqwest::Body::wrap_stream(chunks));
                (request, Some(tx))
            }
            Payload::Body => {
                let json = serde_json::to_vec(payload)
                    .map_err(|e| StorageError::Write(format!("can't encode request body: {}", e)))?;
                (request.body(json), None)
            }
        };

        debug!(url, ?mode, "Sending request to cloud storage");
        let exchange = tokio::spawn(request.send());

        Ok(Connection {
            url: url.to_string(),
            body,
            exchange: Some(exchange),
        })
    }
}

/// One in-flight request
///
/// Dropping a connection that was never drained aborts the exchange.
pub struct Connection {
    url: String,
    body: Option<mpsc::Sender<std::io::Result<Bytes>>>,
    exchange: Option<JoinHandle<reqwest::Result<Response>>>,
}

impl Connection {
    /// Append bytes to the streaming request body
    ///
    /// If the service answers before taking the chunk, the connection is
    /// drained and the service's error is returned instead of a bare write
    /// failure. The service may answer early and stop reading the body without
    /// closing it, so the send is raced against the exchange.
    pub async fn write(&mut self, chunk: Bytes) -> Result<()> {
        let (Some(body), Some(exchange)) = (&self.body, self.exchange.as_mut()) else {
            return Err(StorageError::Write(format!(
                "request to {} has no open body",
                self.url
            )));
        };

        let outcome = tokio::select! {
            sent = body.send(Ok(chunk)) => WriteOutcome::Sent(sent.is_ok()),
            joined = exchange => WriteOutcome::Answered(joined),
        };

        match outcome {
            WriteOutcome::Sent(true) => Ok(()),
            WriteOutcome::Sent(false) => Err(self.closed_early().await),
            WriteOutcome::Answered(joined) => {
                self.exchange = None;
                self.body = None;
                debug!(url = %self.url, "Cloud storage answered before the request body was complete");
                match joined_response(joined) {
                    Ok(response) => Err(self.answered_early(response).await),
                    Err(e) => Err(e),
                }
            }
        }
    }

    async fn closed_early(&mut self) -> StorageError {
        match self.response().await {
            Ok(response) => self.answered_early(response).await,
            Err(e) => e,
        }
    }

    async fn answered_early(&self, response: Response) -> StorageError {
        match read_json(response).await {
            Err(e) => e,
            Ok(_) => StorageError::Write(format!(
                "cloud storage answered {} before the request body was complete",
                self.url
            )),
        }
    }

    /// Close the body and wait for the response head
    async fn response(&mut self) -> Result<Response> {
        self.body.take();
        let exchange = self
            .exchange
            .take()
            .ok_or_else(|| StorageError::Read(format!("response from {} was already consumed", self.url)))?;

        joined_response(exchange.await)
    }
}

enum WriteOutcome {
    Sent(bool),
    Answered(std::result::Result<reqwest::Result<Response>, JoinError>),
}

fn joined_response(
    joined: std::result::Result<reqwest::Result<Response>, JoinError>,
) -> Result<Response> {
    match joined {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => Err(StorageError::from_send(e)),
        Err(e) => Err(StorageError::Write(format!("request task failed: {}", e))),
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(exchange) = self.exchange.take() {
            exchange.abort();
        }
    }
}

/// Finish a request and parse its JSON response
///
/// `None` means the step was skipped and yields an empty object.
pub async fn drain(connection: Option<Connection>) -> Result<Value> {
    let Some(mut connection) = connection else {
        return Ok(Value::Object(Map::new()));
    };
    let response = connection.response().await?;
    read_json(response).await
}

async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let url = response.url().to_string();

    if status != StatusCode::OK {
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url, error = %e, "Can't read error response body");
                Bytes::new()
            }
        };
        return Err(StorageError::from_status(status, &body));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| StorageError::Read(e.to_string()))?;

    debug!(url, bytes = body.len(), "Received response from cloud storage");

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(&body)
        .map_err(|e| StorageError::Read(format!("malformed JSON from {}: {}", url, e)))
}

/// Serialize to JSON with every non-ASCII character `\u`-escaped
///
/// HTTP header values must be plain ASCII, so filenames in commit paths are
/// sent as escapes.
pub fn header_safe_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let json = serde_json::to_string(value)?;
    let mut escaped = String::with_capacity(json.len());
    let mut units = [0u16; 2];

    for c in json.chars() {
        if c.is_ascii() && c != '\u{7f}' {
            escaped.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(escaped)
}
