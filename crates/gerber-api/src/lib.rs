//! # Gerber API
//! 
//! HTTP handlers, request extractors, response envelope and router.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
