//! # Gerber Core - Domain Module
//! 
//! Domain entities for the Gerber order backend.

pub mod role;
pub mod user;
pub mod session;
pub mod order;

pub use role::Role;
pub use user::{Registration, UserAccount, UserInfo};
pub use session::{FilePair, Session};
pub use order::{BoardSpec, DesignFile, DesignUpload, NewOrder, Order, OrderStatus, OrderSummary};
