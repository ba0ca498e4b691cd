//! Identity/credential backend (port)

use async_trait::async_trait;

use crate::domain::{Role, UserAccount};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserAccount>, DomainError>;
    async fn find_by_user_name(&self, user_name: &str) -> Result<Option<UserAccount>, DomainError>;
    async fn find_by_phone_number(&self, phone_number: &str) -> Result<Option<UserAccount>, DomainError>;
    async fn create(&self, user: &UserAccount) -> Result<UserAccount, DomainError>;
    /// Replace the whole role set of a user.
    async fn replace_roles(&self, id: &str, roles: Vec<Role>) -> Result<UserAccount, DomainError>;
    async fn list(&self) -> Result<Vec<UserAccount>, DomainError>;
}
