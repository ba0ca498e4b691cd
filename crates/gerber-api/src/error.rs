//! HTTP-facing errors

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use gerber_core::DomainError;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Detail is logged, never sent.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Detail is logged, never sent.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidCredentials => ApiError::Unauthorized("invalid credentials".to_string()),
            DomainError::Unauthenticated => ApiError::Unauthorized("token rejected".to_string()),
            DomainError::NoSuchSession => ApiError::NotFound("No such session".to_string()),
            DomainError::UserNotFound => ApiError::NotFound("User not found".to_string()),
            DomainError::OrderNotFound => ApiError::NotFound("Order not found".to_string()),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            e @ (DomainError::UserNameAlreadyExists(_) | DomainError::PhoneNumberAlreadyExists(_)) => {
                ApiError::Conflict(e.to_string())
            }
            DomainError::PasswordPolicy(msg) | DomainError::ValidationError(msg) => {
                ApiError::BadRequest(msg)
            }
            e @ (DomainError::IoFailure(_)
            | DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::InternalError(_)) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthenticated".to_string())
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, "FORBIDDEN", msg)
            }
            ApiError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, "NOT_FOUND", msg)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
            }
            ApiError::Conflict(msg) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, "CONFLICT", msg)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::error(code, message))).into_response()
    }
}
