//! Process-local order store
//!
//! Orders and design files live in separate maps, as the file is addressed
//! on its own by download links.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use gerber_core::repositories::OrderRepository;
use gerber_core::{DesignFile, DomainError, NewOrder, Order};

pub struct InMemoryOrderRepository {
    orders: DashMap<u64, Order>,
    files: DashMap<u64, DesignFile>,
    next_id: AtomicU64,
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self {
            orders: DashMap::new(),
            files: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let file_id = self.allocate_id();
        self.files.insert(
            file_id,
            DesignFile {
                id: file_id,
                owner_id: order.user_id.clone(),
                file_name: order.design.file_name,
                data: order.design.data,
            },
        );

        let stored = Order {
            id: self.allocate_id(),
            user_id: order.user_id,
            order_number: order.order_number,
            price: order.price,
            status: order.status,
            build_time: order.build_time,
            created_at: order.created_at,
            spec: order.spec,
            file_id,
        };
        self.orders.insert(stored.id, stored.clone());

        info!("Stored order {} ({}) with design file {}", stored.id, stored.order_number, file_id);
        Ok(stored)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone())
            .collect();
        orders.sort_by_key(|o| o.id);
        Ok(orders)
    }

    async fn find_for_user(&self, user_id: &str, id: u64) -> Result<Option<Order>, DomainError> {
        Ok(self
            .orders
            .get(&id)
            .filter(|e| e.value().user_id == user_id)
            .map(|e| e.value().clone()))
    }

    async fn find_file(&self, file_id: u64) -> Result<Option<DesignFile>, DomainError> {
        Ok(self.files.get(&file_id).map(|e| e.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Utc;
    use gerber_core::{BoardSpec, DesignUpload, OrderStatus};

    fn new_order(user_id: &str, number: &str) -> NewOrder {
        NewOrder {
            user_id: user_id.to_string(),
            order_number: number.to_string(),
            price: 1500,
            status: OrderStatus::AwaitingConfirmation,
            build_time: Utc::now(),
            created_at: Utc::now(),
            spec: BoardSpec::default(),
            design: DesignUpload {
                file_name: format!("{}.zip", number),
                data: Bytes::from_static(b"zip"),
            },
        }
    }

    #[tokio::test]
    async fn test_orders_are_scoped_to_their_owner() {
        let repo = InMemoryOrderRepository::new();
        let first = repo.create(new_order("u-1", "O-11-1111111-P")).await.unwrap();
        repo.create(new_order("u-2", "O-22-2222222-P")).await.unwrap();
        let third = repo.create(new_order("u-1", "O-33-3333333-P")).await.unwrap();

        let mine: Vec<u64> = repo.list_for_user("u-1").await.unwrap().iter().map(|o| o.id).collect();
        assert_eq!(mine, vec![first.id, third.id]);

        assert_eq!(repo.find_for_user("u-1", first.id).await.unwrap(), Some(first.clone()));
        assert_eq!(repo.find_for_user("u-2", first.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_design_file_is_stored_with_owner() {
        let repo = InMemoryOrderRepository::new();
        let order = repo.create(new_order("u-1", "O-11-1111111-P")).await.unwrap();

        let file = repo.find_file(order.file_id).await.unwrap().unwrap();
        assert_eq!(file.owner_id, "u-1");
        assert_eq!(file.file_name, "O-11-1111111-P.zip");
        assert_eq!(file.data, Bytes::from_static(b"zip"));
        assert_ne!(file.id, order.id);
        assert_eq!(repo.find_file(9999).await.unwrap(), None);
    }
}
