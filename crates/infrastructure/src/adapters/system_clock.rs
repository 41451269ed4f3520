//! Wall-clock adapter

use chrono::{DateTime, Utc};
use dnac_application::ports::Clock;

/// Clock backed by the system time. Timestamps stored sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
