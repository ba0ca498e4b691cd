//! Files staged against the caller's session
//!
//! The session id always comes from the bearer token's `sid` claim.

use axum::{
    extract::{Multipart, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use serde::Serialize;

use gerber_core::FilePair;

use crate::error::ApiError;
use crate::extract::SessionFromToken;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePairDto {
    /// Base64
    pub file1: String,
    /// Base64
    pub file2: String,
}

impl From<FilePair> for FilePairDto {
    fn from(files: FilePair) -> Self {
        Self {
            file1: STANDARD.encode(&files.file1),
            file2: STANDARD.encode(&files.file2),
        }
    }
}

/// POST /api/session-files/stage (multipart `file1`, `file2`)
pub async fn stage(
    State(state): State<AppState>,
    SessionFromToken(session_id): SessionFromToken,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mut file1: Option<Bytes> = None;
    let mut file2: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file1") => file1 = Some(field.bytes().await?),
            Some("file2") => file2 = Some(field.bytes().await?),
            _ => {}
        }
    }

    let (Some(file1), Some(file2)) = (file1, file2) else {
        return Err(ApiError::BadRequest(
            "Both file1 and file2 are required".to_string(),
        ));
    };

    state
        .files
        .stage_session_files(session_id, FilePair { file1, file2 })
        .await?;
    Ok(Json(ApiResponse::ok()))
}

/// GET /api/session-files/get-session-file
pub async fn get_session_file(
    State(state): State<AppState>,
    SessionFromToken(session_id): SessionFromToken,
) -> Result<Json<ApiResponse<FilePairDto>>, ApiError> {
    let files = state.files.fetch_session_files(session_id).await?;
    Ok(Json(ApiResponse::success(FilePairDto::from(files))))
}

/// DELETE /api/session-files/delete
pub async fn delete(
    State(state): State<AppState>,
    SessionFromToken(session_id): SessionFromToken,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.files.clear_session_files(session_id).await?;
    Ok(Json(ApiResponse::ok()))
}
