//! User account entity and its public projection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use gerber_security::TokenIdentity;

use super::role::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub id: String,
    pub user_name: String,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub city: Option<String>,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn from_registration(
        registration: &Registration,
        password_hash: String,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_name: registration.user_name.clone(),
            first_name: registration.first_name.clone(),
            second_name: registration.second_name.clone(),
            last_name: registration.last_name.clone(),
            email: registration.email.clone(),
            phone_number: registration.phone_number.clone(),
            city: registration.city.clone(),
            password_hash,
            roles: vec![role],
            created_at: now,
        }
    }

    pub fn token_identity(&self) -> TokenIdentity {
        TokenIdentity {
            username: self.user_name.clone(),
            user_id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            roles: self.roles.iter().map(|r| r.as_str().to_string()).collect(),
        }
    }
}

/// Self-service registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Second name is required"))]
    pub second_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 64, message = "User name is required"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone_number: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub city: Option<String>,
}

/// User as returned to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub first_name: String,
    pub second_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub city: Option<String>,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub roles: Vec<Role>,
}

impl From<&UserAccount> for UserInfo {
    fn from(user: &UserAccount) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            second_name: user.second_name.clone(),
            last_name: user.last_name.clone(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            city: user.city.clone(),
            phone_number: user.phone_number.clone(),
            created_at: user.created_at,
            roles: user.roles.clone(),
        }
    }
}
