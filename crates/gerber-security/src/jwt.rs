//! Session-bound JWT handling
//!
//! Tokens are HS256-signed and carry the identity of the user plus the id of the
//! server-side session they were minted for (`sid`). Issuer and audience are
//! checked on every decode and no clock leeway is granted.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use gerber_shared::config::JwtSettings;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Username
    pub sub: String,
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub sid: Uuid,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Who a token is minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub username: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
}

/// Subset of claims read without any verification, for audit attribution only.
#[derive(Debug, Default, Deserialize)]
pub struct UnverifiedClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    validity: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, issuer: &str, audience: &str, validity_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
            validity: Duration::seconds(validity_seconds),
        }
    }

    pub fn from_settings(settings: &JwtSettings) -> Self {
        Self::new(
            &settings.secret,
            &settings.issuer,
            &settings.audience,
            settings.validity_seconds,
        )
    }

    /// Mint a token for `identity` bound to `session_id`, valid from `now`.
    pub fn issue(
        &self,
        identity: &TokenIdentity,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims {
            sub: identity.username.clone(),
            uid: identity.user_id.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            roles: identity.roles.clone(),
            sid: session_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };
        self.encode_claims(&claims)
    }

    pub fn encode_claims(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::CreationError(e.to_string()))
    }

    /// Full verification: signature, issuer, audience and expiry.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation(true))
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Signature, issuer and audience are verified; an elapsed `exp` is tolerated.
    ///
    /// Only meant for the silent-refresh path after [`verify`](Self::verify)
    /// reported [`TokenError::Expired`].
    pub fn verify_ignoring_expiry(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation(false))
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Session id claim of a fully valid bearer header value.
    pub fn session_id_from_bearer(&self, header: &str) -> Option<Uuid> {
        let token = crate::bearer::bearer_token(header)?;
        self.verify(token).ok().map(|claims| claims.sid)
    }

    fn validation(&self, validate_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = validate_exp;
        validation.leeway = 0;
        validation
    }
}

fn classify(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::Invalid("invalid signature".to_string()),
        ErrorKind::InvalidAudience => TokenError::Invalid("invalid audience".to_string()),
        ErrorKind::InvalidIssuer => TokenError::Invalid("invalid issuer".to_string()),
        _ => TokenError::Invalid(format!("malformed token: {}", e)),
    }
}

/// Read the payload of a token without checking anything.
///
/// Never use the result for authorization.
pub fn peek_unverified(token: &str) -> Option<UnverifiedClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}
