//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A `Set-Cookie` header could not be parsed into a cookie.
    #[error("invalid Set-Cookie header")]
    InvalidSetCookie,

    /// The scheme is neither `http` nor `https`.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// The HTTP method is not supported for login.
    #[error("unsupported login method: {0}")]
    UnsupportedMethod(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
