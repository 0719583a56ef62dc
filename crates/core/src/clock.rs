//! Time sources. All persisted timestamps are millisecond-precision UTC,
//! derived from a `Clock` implementation rather than ad-hoc `Utc::now()`
//! calls, so tests can inject deterministic time.

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = Utc::now().timestamp_millis();
        Utc.timestamp_millis_opt(millis).single().unwrap_or_else(Utc::now)
    }
}

/// Wraps any `Clock`, bumping the reading by 1ms whenever it would not be
/// strictly after the last timestamp this wrapper returned — the
/// mechanism behind "if two events land in the same millisecond, the
/// second gets last+1ms" (spec §4.2/§4.5).
pub struct MonotonicClock<C: Clock> {
    inner: C,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl<C: Clock> MonotonicClock<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }
}

impl<C: Clock> Clock for MonotonicClock<C> {
    fn now(&self) -> DateTime<Utc> {
        let raw = self.inner.now();
        let mut last = self.last.lock();
        let next = match *last {
            Some(prev) if raw <= prev => prev + chrono::Duration::milliseconds(1),
            _ => raw,
        };
        *last = Some(next);
        next
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn at_epoch_ms(ms: i64) -> Self {
        Self::new(Utc.timestamp_millis_opt(ms).single().unwrap_or_default())
    }

    pub fn advance(&self, millis: i64) {
        let mut now = self.now.lock();
        *now += chrono::Duration::milliseconds(millis);
    }

    pub fn set(&self, when: DateTime<Utc>) {
        let mut now = self.now.lock();
        *now = when;
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
