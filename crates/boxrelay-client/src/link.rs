//! Temporary link resolution

use crate::transport::{self, Payload, Transport};
use crate::{integrity, CommittedObject, Config, Result, StorageError, TemporaryLink};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

const TEMPORARY_LINK_ROUTE: &str = "get_temporary_link";

#[derive(Serialize)]
struct LinkArg<'a> {
    path: &'a str,
}

/// Resolves committed objects into verified download links
pub struct LinkResolver<'a> {
    transport: &'a Transport,
    config: &'a Config,
}

impl<'a> LinkResolver<'a> {
    /// Create a resolver over the client's transport
    pub fn new(transport: &'a Transport, config: &'a Config) -> Self {
        Self { transport, config }
    }

    /// Request a temporary link and check it against the recorded hash
    pub async fn resolve(&self, object: &CommittedObject) -> Result<TemporaryLink> {
        let path = object.path_display().ok_or(StorageError::FileNotFound)?;

        debug!(path, "Requesting temporary link");
        let connection = self.transport.send(
            &self.config.api_endpoint(TEMPORARY_LINK_ROUTE),
            "application/json",
            &LinkArg { path },
            Payload::Body,
        )?;

        let response = match transport::drain(Some(connection)).await {
            Ok(response) => response,
            Err(e) => {
                // the API reports path errors as 409 with an error_summary body
                if let StorageError::Status { status: 409, body: Some(body), .. } = &e {
                    if let Some(summary) = error_summary(body) {
                        return Err(StorageError::Remote(summary.to_string()));
                    }
                }
                return Err(e);
            }
        };

        if let Some(summary) = error_summary(&response) {
            return Err(StorageError::Remote(summary.to_string()));
        }

        integrity::verify(object, &response)?;

        let link = response
            .get("link")
            .and_then(Value::as_str)
            .ok_or_else(|| StorageError::Read("temporary link response has no link".to_string()))?;
        let content_hash = response
            .pointer("/metadata/content_hash")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(TemporaryLink {
            link: link.to_string(),
            content_hash: content_hash.to_string(),
        })
    }
}

fn error_summary(value: &Value) -> Option<&str> {
    value.get("error_summary").and_then(Value::as_str)
}
