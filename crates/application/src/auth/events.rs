//! Session events and observers.
//!
//! Every login attempt emits `Started`, then either `CookieSaved` followed by
//! `Succeeded`, or a single `Failed`. Events carry the attempt id and the
//! address the attempt was started with, so overlapping attempts never report
//! against each other's controller.

use std::fmt;

use dnac_domain::ControllerAddress;
use uuid::Uuid;

use crate::error::SessionError;

/// Identifies one `start_authentication` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoginAttemptId(Uuid);

impl LoginAttemptId {
    /// Generates a time-ordered id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for LoginAttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoginAttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Events emitted during a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The attempt was accepted; the login request will be sent.
    Started {
        /// Attempt id.
        attempt: LoginAttemptId,
        /// Controller being authenticated against.
        address: ControllerAddress,
    },
    /// The session cookies were persisted.
    CookieSaved {
        /// Attempt id.
        attempt: LoginAttemptId,
        /// Controller the cookies belong to.
        address: ControllerAddress,
    },
    /// The attempt completed and the session is usable.
    Succeeded {
        /// Attempt id.
        attempt: LoginAttemptId,
        /// Controller now authenticated.
        address: ControllerAddress,
    },
    /// The attempt failed.
    Failed {
        /// Attempt id.
        attempt: LoginAttemptId,
        /// Controller the attempt targeted.
        address: ControllerAddress,
        /// Why it failed.
        error: SessionError,
    },
}

impl SessionEvent {
    /// Attempt the event belongs to.
    #[must_use]
    pub const fn attempt(&self) -> LoginAttemptId {
        match self {
            Self::Started { attempt, .. }
            | Self::CookieSaved { attempt, .. }
            | Self::Succeeded { attempt, .. }
            | Self::Failed { attempt, .. } => *attempt,
        }
    }

    /// Controller the event belongs to.
    #[must_use]
    pub const fn address(&self) -> &ControllerAddress {
        match self {
            Self::Started { address, .. }
            | Self::CookieSaved { address, .. }
            | Self::Succeeded { address, .. }
            | Self::Failed { address, .. } => address,
        }
    }

    /// Check if this event ends its attempt.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}

/// Receives session events.
///
/// Called from the task running the login, which may be a different thread
/// than the one that started it. Implementations must not block.
pub trait SessionObserver: Send + Sync {
    /// Handle one event.
    fn notify(&self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: Fn(&SessionEvent) + Send + Sync,
{
    fn notify(&self, event: &SessionEvent) {
        self(event);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn notify(&self, _event: &SessionEvent) {}
}
