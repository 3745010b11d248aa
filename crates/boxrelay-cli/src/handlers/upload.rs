//! Upload handler

use crate::multipart::{file_part, parse_declared_size, FILE_FIELD, SIZE_FIELD};
use crate::{ApiError, AppState};
use axum::{
    extract::{Multipart, State},
    Json,
};
use boxrelay_client::{CommittedObject, StorageError};
use std::sync::Arc;

/// POST /upload - Stream the `file` field into Dropbox
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<CommittedObject>, ApiError> {
    let mut declared_size = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(SIZE_FIELD) => {
                let value = field.text().await?;
                declared_size = Some(parse_declared_size(&value)?);
            }
            Some(FILE_FIELD) => {
                let part = file_part(field, declared_size)?;
                tracing::debug!(
                    file_name = ?part.file_name,
                    content_type = ?part.content_type,
                    declared_size = part.declared_size,
                    "Received file part"
                );

                let object = state.storage.upload(part).await?;
                return Ok(Json(object));
            }
            other => {
                tracing::debug!(field = ?other, "Skipping multipart field");
            }
        }
    }

    Err(StorageError::MultipartExtraction(format!("no {} field in form", FILE_FIELD)).into())
}
