//! Application-wide constants

/// Token validity window (5 hours).
pub const DEFAULT_TOKEN_VALIDITY_SECONDS: i64 = 5 * 60 * 60;
pub const DEFAULT_SESSION_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 120;
pub const DEFAULT_STAGING_DIR: &str = "Session";
pub const DEFAULT_REGISTRATION_ROLE: &str = "Owner";
pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 10_000;
pub const DEFAULT_AUDIT_RETAINED_ENTRIES: usize = 1_000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;
pub const BEARER_PREFIX: &str = "Bearer ";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
/// Promised build time of a new order.
pub const ORDER_BUILD_LEAD_DAYS: i64 = 14;
