//! Link handler

use crate::{ApiError, AppState};
use axum::{extract::State, Json};
use boxrelay_client::CommittedObject;
use serde::Serialize;
use std::sync::Arc;

/// Response of `POST /link`
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub link: String,
}

/// POST /link - Resolve a committed object into a verified temporary link
pub async fn temporary_link(
    State(state): State<Arc<AppState>>,
    Json(object): Json<CommittedObject>,
) -> Result<Json<LinkResponse>, ApiError> {
    let link = state.storage.get_link(&object).await?;
    Ok(Json(LinkResponse { link }))
}
