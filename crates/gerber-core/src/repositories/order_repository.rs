//! Order store (port)

use async_trait::async_trait;

use crate::domain::{DesignFile, NewOrder, Order};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store the order and its design file, assigning ids to both.
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    /// Oldest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError>;
    async fn find_for_user(&self, user_id: &str, id: u64) -> Result<Option<Order>, DomainError>;
    async fn find_file(&self, file_id: u64) -> Result<Option<DesignFile>, DomainError>;
}
