//! Inbound multipart field handling

use axum::extract::multipart::Field;
use axum::http::{header, HeaderMap};
use boxrelay_client::{FilePart, StorageError};
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::io;
use std::pin::Pin;
use tokio_util::io::StreamReader;

/// Form field carrying the file
pub const FILE_FIELD: &str = "file";

/// Optional form field declaring the file size, sent before `file`
pub const SIZE_FIELD: &str = "size";

/// Byte reader over a multipart field
pub type FieldReader<'a> =
    StreamReader<Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'a>>, Bytes>;

/// Parse the value of the `size` form field
pub fn parse_declared_size(value: &str) -> Result<u64, StorageError> {
    value.trim().parse().map_err(|_| {
        StorageError::MultipartExtraction(format!("invalid {} field {:?}", SIZE_FIELD, value))
    })
}

/// Turn the `file` field into a streaming [`FilePart`]
///
/// The declared size comes from a preceding `size` field or, failing that,
/// from the part's own `Content-Length` header.
pub fn file_part<'a>(
    field: Field<'a>,
    declared_size: Option<u64>,
) -> Result<FilePart<FieldReader<'a>>, StorageError> {
    let declared_size = declared_size
        .or_else(|| content_length(field.headers()))
        .ok_or_else(|| {
            StorageError::MultipartExtraction(format!(
                "{} part has no declared size; send a {} field or a Content-Length part header",
                FILE_FIELD, SIZE_FIELD
            ))
        })?;

    let content_type = field.content_type().map(str::to_string);
    let file_name = field.file_name().map(str::to_string);

    let bytes: Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'a>> =
        Box::pin(field.map_err(io::Error::other));

    Ok(FilePart {
        content_type,
        file_name,
        declared_size,
        reader: StreamReader::new(bytes),
    })
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_declared_size() {
        assert_eq!(parse_declared_size(" 1048576 ").unwrap(), 1048576);
        assert!(matches!(
            parse_declared_size("-1"),
            Err(StorageError::MultipartExtraction(_))
        ));
        assert!(parse_declared_size("ten").is_err());
    }

    #[test]
    fn test_content_length_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_length(&headers), None);

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        assert_eq!(content_length(&headers), Some(42));
    }
}
