//! Domain errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token rejected; details are logged, never returned to the client.
    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("No such session")]
    NoSuchSession,

    #[error("I/O failure: {0}")]
    IoFailure(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Order not found")]
    OrderNotFound,

    #[error("User name already exists: {0}")]
    UserNameAlreadyExists(String),

    #[error("Phone number already exists: {0}")]
    PhoneNumberAlreadyExists(String),

    #[error("Password rejected: {0}")]
    PasswordPolicy(String),

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
