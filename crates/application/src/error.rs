//! Application error types

use thiserror::Error;
use dnac_domain::ControllerAddress;

use crate::ports::{CredentialStoreError, HttpClientError};

/// Errors surfaced by the session manager.
///
/// Cloneable so the same error can reach both the observer and the
/// [`LoginHandle`](crate::auth::LoginHandle) of the attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The login request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] HttpClientError),

    /// The controller answered the login with a status other than 200.
    #[error("authentication rejected with HTTP {status}")]
    AuthRejected {
        /// Status returned by the controller.
        status: u16,
    },

    /// The controller answered 200 without a usable `Set-Cookie` header.
    #[error("login response carried no session cookie")]
    MissingSessionCookie,

    /// No controller address has been set by a login attempt.
    #[error("no active controller; start authentication first")]
    NoActiveController,

    /// No usable session is stored for the active controller.
    #[error("no session stored for {address}")]
    MissingSessionData {
        /// The active controller address.
        address: ControllerAddress,
    },

    /// The credential store failed to persist or read data.
    #[error("credential store error: {0}")]
    Store(#[from] CredentialStoreError),

    /// The login task ended without reporting an outcome.
    #[error("login attempt aborted")]
    Aborted,
}

impl SessionError {
    /// Returns true for failures the caller may fix by retrying the login.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Aborted)
    }
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
