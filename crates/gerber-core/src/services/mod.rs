//! Application services

pub mod auth_service;
pub mod order_service;
pub mod role_policy;
pub mod session_files;
pub mod token_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::AuthService;
pub use order_service::OrderService;
pub use role_policy::authorize_role_change;
pub use session_files::SessionFileService;
pub use token_service::{AuthSession, RefreshReason, RejectionKind, TokenCheck, TokenService};
