//! Test doubles shared by unit and integration tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// A clock pinned to one instant.
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Pin the clock to the given instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(now)
    }

    /// Pin the clock to noon UTC on 5 August 2026, the date most fixtures
    /// are written against.
    pub fn default_test_time() -> Self {
        Self::at(
            Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0)
                .single()
                .expect("valid time"),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}
