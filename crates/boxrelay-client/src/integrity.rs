//! Content-hash verification

use crate::{CommittedObject, Result, StorageError};
use serde_json::Value;
use tracing::warn;

/// Check that the service still holds the content that was committed
///
/// `server` is a response carrying `metadata.content_hash`. A missing hash on
/// either side counts as a mismatch.
pub fn verify(original: &CommittedObject, server: &Value) -> Result<()> {
    let expected = original.content_hash();
    let actual = server.pointer("/metadata/content_hash").and_then(Value::as_str);

    match (expected, actual) {
        (Some(expected), Some(actual)) if expected == actual => Ok(()),
        _ => {
            warn!(
                path = original.path_display().unwrap_or_default(),
                expected = ?expected,
                actual = ?actual,
                "Content hash mismatch"
            );
            Err(StorageError::FileModified {
                expected: expected.map(str::to_string),
                actual: actual.map(str::to_string),
            })
        }
    }
}
