//! Session lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::controller::ControllerAddress;
use crate::cookie::SessionCookieSet;

/// Authentication state of one controller address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No usable session is stored.
    #[default]
    Unauthenticated,
    /// A login exchange is queued or in flight.
    Authenticating,
    /// A session cookie set is stored.
    Authenticated,
}

impl SessionState {
    /// Get a user-friendly message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Not authenticated",
            Self::Authenticating => "Authenticating...",
            Self::Authenticated => "Authenticated",
        }
    }
}

/// A persisted session: the cookies issued for one controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Controller the cookies belong to.
    pub address: ControllerAddress,
    /// Cookies returned by the login endpoint.
    pub cookies: SessionCookieSet,
    /// When the login succeeded.
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    /// Creates a stored session.
    #[must_use]
    pub const fn new(
        address: ControllerAddress,
        cookies: SessionCookieSet,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            address,
            cookies,
            saved_at,
        }
    }
}
