// ============================================================================
// Gerber API - Auth Handlers
// File: crates/gerber-api/src/handlers/auth.rs
// ============================================================================
//! Registration, login, token refresh and the user directory

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use gerber_core::services::{AuthSession, TokenCheck};
use gerber_core::{Registration, Role, UserInfo};

use crate::error::ApiError;
use crate::extract::{AuthenticatedUser, BearerToken};
use crate::response::ApiResponse;
use crate::state::AppState;

const DIRECTORY_ROLES: [Role; 2] = [Role::Owner, Role::Admin];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub user_name: String,
    pub new_role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
    /// Set when the presented token was replaced.
    pub refreshed: bool,
}

impl AuthResponse {
    fn new(session: AuthSession, refreshed: bool) -> Self {
        Self {
            token: session.token,
            user: session.user,
            refreshed,
        }
    }
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<Registration>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let user = state.auth.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    if payload.user_name.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "User name and password are required".to_string(),
        ));
    }

    let session = state.auth.login(&payload.user_name, &payload.password).await?;
    Ok(Json(ApiResponse::success(AuthResponse::new(session, false))))
}

/// POST /api/auth/me
///
/// Returns the presented token while its session is live, otherwise a fresh
/// token bound to a new session.
pub async fn me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let response = match state.tokens.check(&token).await {
        TokenCheck::Reauthenticated(session) => AuthResponse::new(session, false),
        TokenCheck::Refreshed { session, reason } => {
            info!("Issued refreshed token for {} ({:?})", session.user.user_name, reason);
            AuthResponse::new(session, true)
        }
        TokenCheck::Rejected(kind) => {
            return Err(ApiError::Unauthorized(format!("{:?}", kind)));
        }
    };
    Ok(Json(ApiResponse::success(response)))
}

/// POST /api/auth/update-role
pub async fn update_role(
    State(state): State<AppState>,
    actor: AuthenticatedUser,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    actor.require_any(&DIRECTORY_ROLES)?;

    let user = state
        .auth
        .update_role(actor.user_id(), &actor.roles(), &payload.user_name, payload.new_role)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /api/auth/users
pub async fn users(
    State(state): State<AppState>,
    actor: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<UserInfo>>>, ApiError> {
    actor.require_any(&DIRECTORY_ROLES)?;
    Ok(Json(ApiResponse::success(state.auth.list_users().await?)))
}

/// GET /api/auth/user/{user_name}
pub async fn user(
    State(state): State<AppState>,
    _actor: AuthenticatedUser,
    Path(user_name): Path<String>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    Ok(Json(ApiResponse::success(state.auth.user_details(&user_name).await?)))
}

/// GET /api/auth/usernames
pub async fn usernames(
    State(state): State<AppState>,
    _actor: AuthenticatedUser,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    Ok(Json(ApiResponse::success(state.auth.usernames().await?)))
}
