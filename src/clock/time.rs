/*!
 * Simulated Time
 * Seconds + nanoseconds pair with explicit carry and borrow
 */

use crate::core::limits::NANOS_PER_SEC;
use crate::core::types::Nanos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point (or span) of simulated time
///
/// `nanoseconds` is always below one second. Ordering compares seconds first,
/// which is correct because of that normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime {
    pub seconds: u32,
    pub nanoseconds: u32,
}

impl SimTime {
    pub const ZERO: Self = Self {
        seconds: 0,
        nanoseconds: 0,
    };

    /// Build a time from parts, carrying excess nanoseconds into seconds
    pub fn new(seconds: u32, nanoseconds: u32) -> Self {
        Self {
            seconds: seconds.saturating_add(nanoseconds / NANOS_PER_SEC),
            nanoseconds: nanoseconds % NANOS_PER_SEC,
        }
    }

    pub fn from_nanos(total: Nanos) -> Self {
        let per_sec = u64::from(NANOS_PER_SEC);
        let seconds = u32::try_from(total / per_sec).unwrap_or(u32::MAX);
        Self {
            seconds,
            nanoseconds: (total % per_sec) as u32,
        }
    }

    /// Split fractional seconds into whole seconds and residual nanoseconds
    ///
    /// Truncates toward zero; negative or non-finite input yields zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        let whole = secs.trunc();
        let nanos = ((secs - whole) * f64::from(NANOS_PER_SEC)) as u32;
        Self::new(whole as u32, nanos)
    }

    pub fn as_nanos(&self) -> Nanos {
        u64::from(self.seconds) * u64::from(NANOS_PER_SEC) + u64::from(self.nanoseconds)
    }

    pub fn as_secs_f64(&self) -> f64 {
        f64::from(self.seconds) + f64::from(self.nanoseconds) / f64::from(NANOS_PER_SEC)
    }

    /// Add `delta` nanoseconds, carrying overflow into seconds
    pub fn advanced_by(&self, delta: Nanos) -> Self {
        let per_sec = u64::from(NANOS_PER_SEC);
        let nanos = u64::from(self.nanoseconds) + delta;
        let carry = u32::try_from(nanos / per_sec).unwrap_or(u32::MAX);
        Self {
            seconds: self.seconds.saturating_add(carry),
            nanoseconds: (nanos % per_sec) as u32,
        }
    }

    pub fn plus(&self, other: SimTime) -> Self {
        self.advanced_by(other.as_nanos())
    }

    /// Time elapsed from `start` until `self`
    ///
    /// Borrows one second when the nanosecond difference is negative. Returns
    /// zero if `start` is later than `self`.
    pub fn elapsed_since(&self, start: SimTime) -> SimTime {
        if *self <= start {
            return Self::ZERO;
        }
        let mut seconds = self.seconds - start.seconds;
        let mut nanos = i64::from(self.nanoseconds) - i64::from(start.nanoseconds);
        if nanos < 0 {
            seconds -= 1;
            nanos += i64::from(NANOS_PER_SEC);
        }
        Self {
            seconds,
            nanoseconds: nanos as u32,
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s {}ns", self.seconds, self.nanoseconds)
    }
}

/// Combined simulated runtime of completed workers
///
/// Wider than [`SimTime`] so long runs with many workers cannot overflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub seconds: u64,
    pub nanoseconds: u64,
}

impl RunTotals {
    pub fn accumulate(&mut self, runtime: SimTime) {
        let per_sec = u64::from(NANOS_PER_SEC);
        self.seconds += u64::from(runtime.seconds);
        self.nanoseconds += u64::from(runtime.nanoseconds);
        self.seconds += self.nanoseconds / per_sec;
        self.nanoseconds %= per_sec;
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.nanoseconds as f64 / f64::from(NANOS_PER_SEC)
    }
}
