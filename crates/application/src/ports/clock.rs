//! Clock port: login timestamps and cookie expiry.

use chrono::{DateTime, Utc};
use dnac_domain::{SessionCookie, StoredSession};

/// Source of the current time for the session manager.
///
/// Stamps `saved_at` on new sessions and decides which stored cookies have
/// passed their expiry. Tests substitute a fixed instant.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Cookies of `session` whose expiry is already behind [`Self::now`].
    /// Session cookies (no expiry) never show up here.
    fn expired_cookies<'a>(&self, session: &'a StoredSession) -> Vec<&'a SessionCookie> {
        let now = self.now();
        session
            .cookies
            .iter()
            .filter(|cookie| cookie.is_expired_at(now))
            .collect()
    }
}
