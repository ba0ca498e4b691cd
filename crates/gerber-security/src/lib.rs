//! # Gerber Security
//! 
//! Security utilities: session-bound JWT codec, bearer parsing, password hashing.

pub mod jwt;
pub mod bearer;
pub mod password;

pub use jwt::{SessionClaims, TokenCodec, TokenError, TokenIdentity};
pub use password::PasswordService;
