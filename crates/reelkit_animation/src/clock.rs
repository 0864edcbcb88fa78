//! Animation clock
//!
//! The scheduler has no timer of its own. Hosts pass a [`Timestamp`] into
//! every `step`, either from a virtual clock (tests, replays) or from a
//! [`FrameClock`] anchored to wall time.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::{Duration, Instant};

/// A point on the host's animation clock, in microseconds from an arbitrary origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The clock origin.
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000)
    }

    pub const fn as_micros(self) -> u64 {
        self.0
    }

    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(micros))
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Timestamp) -> Duration {
        self.saturating_since(rhs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}ms", self.as_millis_f64())
    }
}

/// Maps wall-clock instants onto [`Timestamp`]s.
///
/// Create one when the render loop starts and call [`FrameClock::now`] once
/// per frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    origin: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Clock anchored at a specific instant.
    pub fn anchored_at(origin: Instant) -> Self {
        Self { origin }
    }

    pub fn now(&self) -> Timestamp {
        self.at(Instant::now())
    }

    /// Convert an instant to a timestamp. Instants before the origin map to zero.
    pub fn at(&self, instant: Instant) -> Timestamp {
        Timestamp::zero() + instant.saturating_duration_since(self.origin)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
