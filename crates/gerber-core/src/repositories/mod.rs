//! Port traits implemented by the infrastructure crate

pub mod user_repository;
pub mod session_registry;
pub mod audit_sink;
pub mod order_repository;

pub use user_repository::UserRepository;
pub use session_registry::SessionRegistry;
pub use audit_sink::AuditSink;
pub use order_repository::OrderRepository;

#[cfg(test)]
pub use user_repository::MockUserRepository;
#[cfg(test)]
pub use session_registry::MockSessionRegistry;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
