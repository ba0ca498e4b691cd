// ============================================================================
// Gerber Core - Order Service
// File: crates/gerber-core/src/services/order_service.rs
// ============================================================================
//! Order intake and the per-user order book

use std::sync::Arc;

use chrono::Duration;
use rand::Rng;
use tracing::{info, warn};
use validator::Validate;

use gerber_shared::constants::ORDER_BUILD_LEAD_DAYS;
use gerber_shared::Clock;

use crate::domain::{BoardSpec, DesignFile, DesignUpload, NewOrder, Order, OrderStatus, OrderSummary, Role};
use crate::error::DomainError;
use crate::repositories::{AuditSink, OrderRepository, UserRepository};

/// Roles that may download any customer's design file.
const STAFF_ROLES: [Role; 3] = [Role::Owner, Role::Admin, Role::Manager];

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            users,
            audit,
            clock,
        }
    }

    /// Accept a board spec with its design file. The order starts out awaiting
    /// confirmation, with a quoted price and a generated order number.
    pub async fn place_order(
        &self,
        user_id: &str,
        spec: BoardSpec,
        design: DesignUpload,
    ) -> Result<Order, DomainError> {
        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            warn!("Order rejected: token user {} no longer exists", user_id);
            DomainError::Unauthenticated
        })?;

        spec.validate()
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        if design.data.is_empty() {
            return Err(DomainError::ValidationError("Design file is empty".to_string()));
        }

        let now = self.clock.now();
        let (order_number, price) = quote();
        let order = self
            .orders
            .create(NewOrder {
                user_id: user.id.clone(),
                order_number,
                price,
                status: OrderStatus::AwaitingConfirmation,
                build_time: now + Duration::days(ORDER_BUILD_LEAD_DAYS),
                created_at: now,
                spec,
                design,
            })
            .await?;

        self.audit
            .record_user_action(&user.id, &format!("Placed order {}", order.order_number));
        info!("Order {} placed by {}", order.order_number, user.user_name);
        Ok(order)
    }

    pub async fn orders_for(&self, user_id: &str) -> Result<Vec<OrderSummary>, DomainError> {
        let orders = self.orders.list_for_user(user_id).await?;
        Ok(orders.iter().map(OrderSummary::from).collect())
    }

    /// Only the owner of an order can see it.
    pub async fn order_details(&self, user_id: &str, id: u64) -> Result<Order, DomainError> {
        self.orders
            .find_for_user(user_id, id)
            .await?
            .ok_or(DomainError::OrderNotFound)
    }

    /// The uploader and staff may download a design file. Anyone else sees
    /// [`DomainError::OrderNotFound`].
    pub async fn design_file(
        &self,
        user_id: &str,
        roles: &[Role],
        file_id: u64,
    ) -> Result<DesignFile, DomainError> {
        let is_staff = roles.iter().any(|r| STAFF_ROLES.contains(r));
        self.orders
            .find_file(file_id)
            .await?
            .filter(|file| is_staff || file.owner_id == user_id)
            .ok_or(DomainError::OrderNotFound)
    }
}

/// Order number `O-NN-NNNNNNN-P` and a price. Pricing is a placeholder until
/// quotes come from the catalog.
fn quote() -> (String, u32) {
    let mut rng = rand::rng();
    let order_number = format!(
        "O-{}{}-{}-P",
        rng.random_range(1..9u32),
        rng.random_range(1..9u32),
        rng.random_range(1_000_000..10_000_000u32)
    );
    (order_number, rng.random_range(1000..5000u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::sample_spec;
    use crate::repositories::{MockOrderRepository, MockUserRepository};
    use crate::services::test_support::{account, RecordingAudit};
    use bytes::Bytes;
    use gerber_shared::ManualClock;

    fn users_with(user: crate::domain::UserAccount) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |id: &str| Ok((id == user.id).then(|| user.clone())));
        users
    }

    fn upload() -> DesignUpload {
        DesignUpload {
            file_name: "board.zip".to_string(),
            data: Bytes::from_static(b"PK\x03\x04gerber"),
        }
    }

    fn stored(order: NewOrder) -> Order {
        Order {
            id: 1,
            user_id: order.user_id,
            order_number: order.order_number,
            price: order.price,
            status: order.status,
            build_time: order.build_time,
            created_at: order.created_at,
            spec: order.spec,
            file_id: 7,
        }
    }

    #[tokio::test]
    async fn test_place_order_quotes_and_records() {
        let user = account("pcbmaker", &[Role::User]);
        let mut orders = MockOrderRepository::new();
        orders.expect_create().times(1).returning(|o| Ok(stored(o)));

        let clock = Arc::new(ManualClock::starting_now());
        let audit = Arc::new(RecordingAudit::default());
        let svc = OrderService::new(Arc::new(orders), Arc::new(users_with(user.clone())), audit.clone(), clock.clone());

        let order = svc.place_order(&user.id, sample_spec(), upload()).await.unwrap();

        assert_eq!(order.status, OrderStatus::AwaitingConfirmation);
        assert!((1000..5000).contains(&order.price));
        assert_eq!(order.build_time, clock.now() + Duration::days(ORDER_BUILD_LEAD_DAYS));

        let parts: Vec<&str> = order.order_number.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!((parts[0], parts[3]), ("O", "P"));
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 7);

        assert_eq!(
            audit.actions(),
            vec![(user.id.clone(), format!("Placed order {}", order.order_number))]
        );
    }

    #[tokio::test]
    async fn test_place_order_rejects_unknown_user_and_bad_input() {
        let user = account("pcbmaker", &[Role::User]);
        let mut orders = MockOrderRepository::new();
        orders.expect_create().times(0);
        let svc = OrderService::new(
            Arc::new(orders),
            Arc::new(users_with(user.clone())),
            Arc::new(RecordingAudit::default()),
            Arc::new(ManualClock::starting_now()),
        );

        assert_eq!(
            svc.place_order("ghost", sample_spec(), upload()).await,
            Err(DomainError::Unauthenticated)
        );

        let mut spec = sample_spec();
        spec.size_x = 0;
        assert!(matches!(
            svc.place_order(&user.id, spec, upload()).await,
            Err(DomainError::ValidationError(_))
        ));

        let empty = DesignUpload {
            file_name: "empty.zip".to_string(),
            data: Bytes::new(),
        };
        assert!(matches!(
            svc.place_order(&user.id, sample_spec(), empty).await,
            Err(DomainError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_design_file_visible_to_uploader_and_staff_only() {
        let mut orders = MockOrderRepository::new();
        orders.expect_find_file().returning(|id| {
            Ok((id == 7).then(|| DesignFile {
                id: 7,
                owner_id: "owner-1".to_string(),
                file_name: "board.zip".to_string(),
                data: Bytes::from_static(b"zip"),
            }))
        });
        let svc = OrderService::new(
            Arc::new(orders),
            Arc::new(MockUserRepository::new()),
            Arc::new(RecordingAudit::default()),
            Arc::new(ManualClock::starting_now()),
        );

        assert!(svc.design_file("owner-1", &[Role::User], 7).await.is_ok());
        assert!(svc.design_file("someone", &[Role::Manager], 7).await.is_ok());
        assert_eq!(
            svc.design_file("someone", &[Role::User], 7).await,
            Err(DomainError::OrderNotFound)
        );
        assert_eq!(
            svc.design_file("owner-1", &[Role::User], 8).await,
            Err(DomainError::OrderNotFound)
        );
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let mut orders = MockOrderRepository::new();
        orders.expect_find_for_user().returning(|_, _| Ok(None));
        let svc = OrderService::new(
            Arc::new(orders),
            Arc::new(MockUserRepository::new()),
            Arc::new(RecordingAudit::default()),
            Arc::new(ManualClock::starting_now()),
        );

        assert_eq!(svc.order_details("u-1", 42).await, Err(DomainError::OrderNotFound));
    }
}
