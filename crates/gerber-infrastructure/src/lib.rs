//! # Gerber Infrastructure
//! 
//! Adapters for the core ports: session store with on-disk staging,
//! in-memory identity and order backends, and the queued audit log.

pub mod staging;
pub mod session;
pub mod identity;
pub mod orders;
pub mod audit;

pub use staging::{FileStaging, StagingError};
pub use session::SessionStore;
pub use identity::InMemoryUserRepository;
pub use orders::InMemoryOrderRepository;
pub use audit::{AuditEntry, AuditKind, QueuedAuditLog};
