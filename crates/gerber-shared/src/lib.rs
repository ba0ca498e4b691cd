//! # Gerber Shared
//! 
//! Shared configuration, telemetry, clock and common types for the Gerber backend.

pub mod clock;
pub mod constants;
pub mod types;
pub mod telemetry;
pub mod config;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use types::*;
pub use error::AppError;
