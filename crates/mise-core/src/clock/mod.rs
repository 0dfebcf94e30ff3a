//! Wall-clock abstraction.
//!
//! The clock is the only process-wide dependency the core admits. It is
//! injected at construction so tests can pin time.

use chrono::{DateTime, Utc};

/// Narrow clock interface: current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The process clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, for tests and dry runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// Compile-time assertion: Clock must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Clock) {}
};
