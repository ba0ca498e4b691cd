//! Client-side error reporting

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use gerber_core::repositories::AuditSink;
use gerber_core::Role;
use gerber_infrastructure::AuditEntry;

use crate::error::ApiError;
use crate::extract::AuthenticatedUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClientLogRequest {
    pub message: String,
}

/// POST /api/logger/set-log/{user_id}
pub async fn set_log(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ClientLogRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message is required".to_string()));
    }

    state.audit.record_client_error(&payload.message, Some(&user_id));
    Ok(Json(ApiResponse::ok()))
}

/// GET /api/logger/get-log/{user_id}
pub async fn get_log(
    State(state): State<AppState>,
    actor: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<AuditEntry>>>, ApiError> {
    actor.require_any(&[Role::Owner, Role::Admin])?;
    Ok(Json(ApiResponse::success(state.audit.history_for(&user_id))))
}
