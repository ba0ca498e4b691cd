// ============================================================================
// Gerber Core - Authentication Service
// File: crates/gerber-core/src/services/auth_service.rs
// ============================================================================
//! Login, registration, role management and the user directory

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use gerber_security::PasswordService;
use gerber_shared::Clock;

use crate::domain::{Registration, Role, UserAccount, UserInfo};
use crate::error::DomainError;
use crate::repositories::{AuditSink, UserRepository};
use crate::services::role_policy::authorize_role_change;
use crate::services::token_service::{AuthSession, TokenService};

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    registration_role: Role,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
        registration_role: Role,
    ) -> Self {
        Self {
            users,
            tokens,
            audit,
            clock,
            registration_role,
        }
    }

    /// Login with user name and password. Every login gets a new session.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<AuthSession, DomainError> {
        info!("Login attempt for: {}", user_name);

        let user = self
            .users
            .find_by_user_name(user_name)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown user name: {}", user_name);
                DomainError::InvalidCredentials
            })?;

        let password_valid = PasswordService::verify(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;
        if !password_valid {
            warn!("Login failed: invalid password for: {}", user_name);
            return Err(DomainError::InvalidCredentials);
        }

        let session = self.tokens.mint(&user).await?;
        self.audit.record_user_action(&user.id, "Logged in");

        info!("Login successful for: {}", user_name);
        Ok(session)
    }

    pub async fn register(&self, registration: &Registration) -> Result<UserInfo, DomainError> {
        info!("Registration attempt for: {}", registration.user_name);

        registration
            .validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        PasswordService::check_policy(&registration.password)
            .map_err(|e| DomainError::PasswordPolicy(e.to_string()))?;

        if self
            .users
            .find_by_user_name(&registration.user_name)
            .await?
            .is_some()
        {
            warn!("Registration failed: user name taken: {}", registration.user_name);
            return Err(DomainError::UserNameAlreadyExists(registration.user_name.clone()));
        }

        if self
            .users
            .find_by_phone_number(&registration.phone_number)
            .await?
            .is_some()
        {
            warn!("Registration failed: phone number taken: {}", registration.phone_number);
            return Err(DomainError::PhoneNumberAlreadyExists(
                registration.phone_number.clone(),
            ));
        }

        let password_hash = PasswordService::hash(&registration.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;

        let account = UserAccount::from_registration(
            registration,
            password_hash,
            self.registration_role,
            self.clock.now(),
        );
        let created = self.users.create(&account).await?;

        self.audit.record_user_action(&created.id, "Registered");
        info!("Registration successful for: {}", created.user_name);
        Ok(UserInfo::from(&created))
    }

    /// Replace the role set of `user_name` with exactly `{new_role}`.
    pub async fn update_role(
        &self,
        actor_id: &str,
        actor_roles: &[Role],
        user_name: &str,
        new_role: Role,
    ) -> Result<UserInfo, DomainError> {
        let target = self
            .users
            .find_by_user_name(user_name)
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if let Err(e) = authorize_role_change(actor_roles, &target.roles, new_role) {
            warn!("Role change of {} to {} refused: {}", user_name, new_role, e);
            return Err(e);
        }

        let updated = self.users.replace_roles(&target.id, vec![new_role]).await?;
        self.audit.record_user_action(
            actor_id,
            &format!("Changed role of {} to {}", user_name, new_role),
        );

        info!("Role of {} changed to {}", user_name, new_role);
        Ok(UserInfo::from(&updated))
    }

    pub async fn list_users(&self) -> Result<Vec<UserInfo>, DomainError> {
        let users = self.users.list().await?;
        Ok(users.iter().map(UserInfo::from).collect())
    }

    pub async fn user_details(&self, user_name: &str) -> Result<UserInfo, DomainError> {
        self.users
            .find_by_user_name(user_name)
            .await?
            .map(|u| UserInfo::from(&u))
            .ok_or(DomainError::UserNotFound)
    }

    pub async fn usernames(&self) -> Result<Vec<String>, DomainError> {
        let users = self.users.list().await?;
        Ok(users.into_iter().map(|u| u.user_name).collect())
    }
}
