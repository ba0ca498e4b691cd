//! # Gerber Core
//! 
//! Domain entities, services, and port traits for the Gerber order backend.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
