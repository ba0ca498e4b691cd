//! Request extractors for bearer-token authentication

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use gerber_core::repositories::SessionRegistry;
use gerber_core::Role;
use gerber_security::bearer::bearer_token;
use gerber_security::SessionClaims;
use gerber_shared::SessionId;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

fn authorization(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Authorization header is not ASCII".to_string()))
}

/// Session id bound to a fully valid bearer token. Extracting it counts as
/// activity on that session.
#[derive(Debug, Clone, Copy)]
pub struct SessionFromToken(pub SessionId);

impl FromRequestParts<AppState> for SessionFromToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = authorization(parts)?;
        let session_id = state
            .codec
            .session_id_from_bearer(header)
            .ok_or_else(|| ApiError::Unauthorized("bearer token rejected".to_string()))?;

        // A swept session stays gone; the file operations report it.
        if state.sessions.touch(session_id).await.is_none() {
            debug!("Request for session {} which is no longer live", session_id);
        }
        Ok(SessionFromToken(session_id))
    }
}

/// Raw bearer token, unverified. Used by the refresh endpoint, which must see
/// expired tokens too.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let header = authorization(parts)?;
        bearer_token(header)
            .map(|t| BearerToken(t.to_string()))
            .ok_or_else(|| ApiError::Unauthorized("malformed bearer header".to_string()))
    }
}

/// Claims of a fully valid bearer token. Also extends the token's session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionClaims);

impl AuthenticatedUser {
    pub fn roles(&self) -> Vec<Role> {
        Role::parse_all(&self.0.roles)
    }

    pub fn user_id(&self) -> &str {
        &self.0.uid
    }

    pub fn require_any(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if self.roles().iter().any(|r| allowed.contains(r)) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "{} lacks the required role",
                self.0.sub
            )))
        }
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let claims = state
            .codec
            .verify(&token)
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        state.sessions.touch(claims.sid).await;
        Ok(AuthenticatedUser(claims))
    }
}
