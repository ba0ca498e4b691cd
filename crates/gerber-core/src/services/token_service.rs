// ============================================================================
// Gerber Core - Token Service
// File: crates/gerber-core/src/services/token_service.rs
// ============================================================================
//! Session-bound token issuance and the "who am I" refresh state machine.
//!
//! A presented token ends up in exactly one [`TokenCheck`] state:
//!
//! | token                              | session  | outcome                         |
//! |------------------------------------|----------|---------------------------------|
//! | valid                              | live     | `Reauthenticated` (same token)  |
//! | valid                              | gone     | `Refreshed(SessionExpired)`     |
//! | expired, signature/iss/aud valid   | n/a      | `Refreshed(TokenExpired)`       |
//! | bad signature/iss/aud, malformed   | n/a      | `Rejected(InvalidToken)`        |
//! | backend or signing failure         | n/a      | `Rejected(InternalTokenError)`  |
//!
//! A live session is extended through the registry's refresh threshold, so an
//! active client keeps its session and staged files across sweeps.
//!
//! On the expired path the token's username is trusted for identity lookup
//! only; the refreshed token carries whatever roles the backend reports now.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use gerber_security::jwt::peek_unverified;
use gerber_security::{SessionClaims, TokenCodec, TokenError};
use gerber_shared::Clock;

use crate::domain::{Session, UserAccount, UserInfo};
use crate::error::DomainError;
use crate::repositories::{AuditSink, SessionRegistry, UserRepository};

/// Token handed to a client together with the user it identifies.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// Token was valid but its session had been swept.
    SessionExpired,
    /// Token signature had expired.
    TokenExpired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    InvalidToken,
    InternalTokenError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenCheck {
    Reauthenticated(AuthSession),
    Refreshed {
        session: AuthSession,
        reason: RefreshReason,
    },
    Rejected(RejectionKind),
}

impl TokenCheck {
    pub fn into_result(self) -> Result<AuthSession, DomainError> {
        match self {
            TokenCheck::Reauthenticated(session) => Ok(session),
            TokenCheck::Refreshed { session, .. } => Ok(session),
            TokenCheck::Rejected(_) => Err(DomainError::Unauthenticated),
        }
    }
}

pub struct TokenService {
    codec: Arc<TokenCodec>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRegistry>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(
        codec: Arc<TokenCodec>,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRegistry>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            users,
            sessions,
            audit,
            clock,
        }
    }

    /// Mint a token for `user` bound to a freshly allocated session.
    pub async fn mint(&self, user: &UserAccount) -> Result<AuthSession, DomainError> {
        let session = self.sessions.get_or_create(None).await;
        self.issue_for(user, session)
    }

    fn issue_for(&self, user: &UserAccount, session: Session) -> Result<AuthSession, DomainError> {
        let token = self
            .codec
            .issue(&user.token_identity(), session.id, self.clock.now())
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        debug!("Minted token for {} bound to session {}", user.user_name, session.id);
        Ok(AuthSession {
            token,
            user: UserInfo::from(user),
        })
    }

    /// `issueOrRefreshToken`: the state machine collapsed to token-or-unauthenticated.
    pub async fn issue_or_refresh_token(&self, presented: &str) -> Result<AuthSession, DomainError> {
        self.check(presented).await.into_result()
    }

    pub async fn check(&self, presented: &str) -> TokenCheck {
        match self.codec.verify(presented) {
            Ok(claims) => self.check_valid(presented, claims).await,
            Err(TokenError::Expired) => self.refresh_expired(presented).await,
            Err(TokenError::Invalid(reason)) => self.reject_invalid(presented, &reason),
            Err(e) => self.reject_internal(&e.to_string(), None),
        }
    }

    async fn check_valid(&self, presented: &str, claims: SessionClaims) -> TokenCheck {
        let user = match self.load_user(&claims).await {
            Ok(user) => user,
            Err(check) => return check,
        };

        let session = self.sessions.get_or_create(Some(claims.sid)).await;
        if session.id == claims.sid {
            debug!("Session {} still live, reusing token for {}", claims.sid, claims.sub);
            return TokenCheck::Reauthenticated(AuthSession {
                token: presented.to_string(),
                user: UserInfo::from(&user),
            });
        }

        info!("Session {} expired, minting new token for {}", claims.sid, claims.sub);
        let issued = self.issue_for(&user, session);
        self.refreshed(&user, issued, RefreshReason::SessionExpired)
    }

    async fn refresh_expired(&self, presented: &str) -> TokenCheck {
        let claims = match self.codec.verify_ignoring_expiry(presented) {
            Ok(claims) => claims,
            Err(TokenError::Invalid(reason)) => return self.reject_invalid(presented, &reason),
            Err(e) => return self.reject_internal(&e.to_string(), None),
        };

        let user = match self.load_user(&claims).await {
            Ok(user) => user,
            Err(check) => return check,
        };

        info!("Token for {} expired, issuing a silent refresh", claims.sub);
        let issued = self.mint(&user).await;
        self.refreshed(&user, issued, RefreshReason::TokenExpired)
    }

    fn refreshed(
        &self,
        user: &UserAccount,
        issued: Result<AuthSession, DomainError>,
        reason: RefreshReason,
    ) -> TokenCheck {
        match issued {
            Ok(session) => {
                self.audit.record_user_action(&user.id, "Token refreshed");
                TokenCheck::Refreshed { session, reason }
            }
            Err(e) => self.reject_internal(&e.to_string(), Some(&user.id)),
        }
    }

    async fn load_user(&self, claims: &SessionClaims) -> Result<UserAccount, TokenCheck> {
        match self.users.find_by_user_name(&claims.sub).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                warn!("Token subject {} no longer exists", claims.sub);
                self.audit
                    .record_error("Token subject no longer exists", Some(&claims.uid));
                Err(TokenCheck::Rejected(RejectionKind::InvalidToken))
            }
            Err(e) => Err(self.reject_internal(&e.to_string(), Some(&claims.uid))),
        }
    }

    fn reject_invalid(&self, presented: &str, reason: &str) -> TokenCheck {
        let user_id = peek_unverified(presented).and_then(|c| c.uid);
        warn!("Token rejected ({}), claimed user: {:?}", reason, user_id);
        self.audit
            .record_error(&format!("Token validation failed: {}", reason), user_id.as_deref());
        TokenCheck::Rejected(RejectionKind::InvalidToken)
    }

    fn reject_internal(&self, reason: &str, user_id: Option<&str>) -> TokenCheck {
        error!("Token processing failed: {}", reason);
        self.audit
            .record_error(&format!("Token processing failed: {}", reason), user_id);
        TokenCheck::Rejected(RejectionKind::InternalTokenError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::repositories::{MockSessionRegistry, MockUserRepository};
    use crate::services::test_support::{account, RecordingAudit, SECRET};
    use chrono::{Duration, Utc};
    use gerber_shared::SystemClock;
    use uuid::Uuid;

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(SECRET, "gerber-backend", "gerber-frontend", 5 * 3600))
    }

    fn users_with(user: UserAccount) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_user_name().returning(move |name: &str| {
            Ok((name == user.user_name).then(|| user.clone()))
        });
        users
    }

    fn service(
        users: MockUserRepository,
        sessions: MockSessionRegistry,
        audit: Arc<RecordingAudit>,
    ) -> TokenService {
        TokenService::new(
            codec(),
            Arc::new(users),
            Arc::new(sessions),
            audit,
            Arc::new(SystemClock),
        )
    }

    #[tokio::test]
    async fn test_warm_session_reuses_token() {
        let user = account("pcbmaker", &[Role::User]);
        let sid = Uuid::new_v4();
        let token = codec().issue(&user.token_identity(), sid, Utc::now()).unwrap();

        let mut sessions = MockSessionRegistry::new();
        sessions
            .expect_get_or_create()
            .times(1)
            .returning(move |id| Session::new(id.unwrap(), Utc::now()));
        sessions.expect_is_valid().times(0);

        let audit = Arc::new(RecordingAudit::default());
        let svc = service(users_with(user), sessions, audit.clone());

        match svc.check(&token).await {
            TokenCheck::Reauthenticated(session) => {
                assert_eq!(session.token, token);
                assert_eq!(session.user.user_name, "pcbmaker");
            }
            other => panic!("expected Reauthenticated, got {:?}", other),
        }
        assert!(audit.errors().is_empty());
    }

    #[tokio::test]
    async fn test_swept_session_gets_new_session_same_identity() {
        let user = account("pcbmaker", &[Role::Manager]);
        let old_sid = Uuid::new_v4();
        let new_sid = Uuid::new_v4();
        let token = codec().issue(&user.token_identity(), old_sid, Utc::now()).unwrap();

        let mut sessions = MockSessionRegistry::new();
        sessions
            .expect_get_or_create()
            .withf(move |id| *id == Some(old_sid))
            .times(1)
            .returning(move |_| Session::new(new_sid, Utc::now()));

        let audit = Arc::new(RecordingAudit::default());
        let svc = service(users_with(user.clone()), sessions, audit.clone());

        match svc.check(&token).await {
            TokenCheck::Refreshed { session, reason } => {
                assert_eq!(reason, RefreshReason::SessionExpired);
                assert_ne!(session.token, token);
                let claims = codec().verify(&session.token).unwrap();
                assert_eq!(claims.sid, new_sid);
                assert_eq!(claims.sub, "pcbmaker");
                assert_eq!(claims.uid, user.id);
            }
            other => panic!("expected Refreshed, got {:?}", other),
        }
        assert_eq!(audit.actions(), vec![(user.id.clone(), "Token refreshed".to_string())]);
    }

    #[tokio::test]
    async fn test_expired_token_is_silently_refreshed() {
        let user = account("pcbmaker", &[Role::User]);
        let new_sid = Uuid::new_v4();
        let token = codec()
            .issue(&user.token_identity(), Uuid::new_v4(), Utc::now() - Duration::hours(6))
            .unwrap();

        let mut sessions = MockSessionRegistry::new();
        sessions.expect_is_valid().times(0);
        sessions
            .expect_get_or_create()
            .returning(move |_| Session::new(new_sid, Utc::now()));

        let svc = service(users_with(user), sessions, Arc::new(RecordingAudit::default()));

        match svc.check(&token).await {
            TokenCheck::Refreshed { session, reason } => {
                assert_eq!(reason, RefreshReason::TokenExpired);
                let claims = codec().verify(&session.token).unwrap();
                assert_eq!(claims.sub, "pcbmaker");
                assert_eq!(claims.sid, new_sid);
            }
            other => panic!("expected Refreshed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_key_is_rejected_and_attributed() {
        let user = account("pcbmaker", &[Role::User]);
        let foreign = TokenCodec::new("some-other-secret-some-other-sec", "gerber-backend", "gerber-frontend", 3600);
        let token = foreign.issue(&user.token_identity(), Uuid::new_v4(), Utc::now()).unwrap();

        let mut sessions = MockSessionRegistry::new();
        sessions.expect_get_or_create().times(0);
        let audit = Arc::new(RecordingAudit::default());
        let svc = service(users_with(user.clone()), sessions, audit.clone());

        assert_eq!(svc.check(&token).await, TokenCheck::Rejected(RejectionKind::InvalidToken));
        let errors = audit.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].1.as_deref(), Some(user.id.as_str()));
        assert_eq!(
            svc.issue_or_refresh_token(&token).await,
            Err(DomainError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_expired_token_with_wrong_key_is_not_refreshed() {
        let user = account("pcbmaker", &[Role::User]);
        let foreign = TokenCodec::new("some-other-secret-some-other-sec", "gerber-backend", "gerber-frontend", 3600);
        let token = foreign
            .issue(&user.token_identity(), Uuid::new_v4(), Utc::now() - Duration::hours(6))
            .unwrap();

        let mut sessions = MockSessionRegistry::new();
        sessions.expect_get_or_create().times(0);
        let svc = service(users_with(user), sessions, Arc::new(RecordingAudit::default()));

        assert_eq!(svc.check(&token).await, TokenCheck::Rejected(RejectionKind::InvalidToken));
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected_without_attribution() {
        let audit = Arc::new(RecordingAudit::default());
        let svc = service(MockUserRepository::new(), MockSessionRegistry::new(), audit.clone());

        assert_eq!(svc.check("garbage").await, TokenCheck::Rejected(RejectionKind::InvalidToken));
        assert_eq!(audit.errors()[0].1, None);
    }

    #[tokio::test]
    async fn test_backend_failure_is_internal_error() {
        let user = account("pcbmaker", &[Role::User]);
        let token = codec().issue(&user.token_identity(), Uuid::new_v4(), Utc::now()).unwrap();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_user_name()
            .returning(|_| Err(DomainError::InternalError("backend down".to_string())));

        let svc = service(users, MockSessionRegistry::new(), Arc::new(RecordingAudit::default()));
        assert_eq!(
            svc.check(&token).await,
            TokenCheck::Rejected(RejectionKind::InternalTokenError)
        );
    }

    #[tokio::test]
    async fn test_deleted_user_is_rejected() {
        let ghost = account("ghost", &[Role::User]);
        let token = codec().issue(&ghost.token_identity(), Uuid::new_v4(), Utc::now()).unwrap();

        let svc = service(
            users_with(account("someone-else", &[Role::User])),
            MockSessionRegistry::new(),
            Arc::new(RecordingAudit::default()),
        );
        assert_eq!(svc.check(&token).await, TokenCheck::Rejected(RejectionKind::InvalidToken));
    }
}
