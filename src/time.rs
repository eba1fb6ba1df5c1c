//! Clock abstraction.
//!
//! Everything that compares deadlines or stamps entities goes through a
//! [`TimeProvider`] so the SLA monitor can be driven with a controlled clock
//! in tests.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// --- Real implementation ---

#[derive(Default)]
pub struct RealTimeProvider;

impl RealTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// --- Fake implementation ---

/// Settable clock for tests. Starts at a fixed instant and only moves when
/// told to.
pub struct FakeTimeProvider {
    now: Mutex<DateTime<Utc>>,
}

impl FakeTimeProvider {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl TimeProvider for FakeTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
