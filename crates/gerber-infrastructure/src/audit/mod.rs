//! Audit sink adapters

pub mod queued;

pub use queued::{AuditEntry, AuditKind, QueuedAuditLog};
