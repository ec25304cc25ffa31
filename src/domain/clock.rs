//! Time source for progress timestamps.
//!
//! Saved progress is always stamped with server time, so the clock is
//! injected rather than read ambiently; tests pin it with [`FixedClock`].

use std::fmt::Debug;

pub trait Clock: Send + Sync + Debug {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> i64;
}

/// Wall clock backed by [`chrono::Utc`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;
