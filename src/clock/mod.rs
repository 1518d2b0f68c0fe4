/*!
 * Simulated Clock
 * Coordinator-owned logical clock, optionally published to a shared segment
 */

mod time;

pub use time::{RunTotals, SimTime};

use crate::core::types::Nanos;
use crate::ipc::shm::{ClockSegment, ShmResult};

/// The coordinator's clock
///
/// The authoritative value lives in process memory; every advance is also
/// published to the shared segment when one is attached. Only the owner of a
/// `SimClock` can move time forward.
#[derive(Debug)]
pub struct SimClock {
    now: SimTime,
    segment: Option<ClockSegment>,
}

impl SimClock {
    /// Clock that is not visible to other processes
    pub fn local() -> Self {
        Self {
            now: SimTime::ZERO,
            segment: None,
        }
    }

    /// Clock published through `segment`, reset to zero
    pub fn shared(segment: ClockSegment) -> ShmResult<Self> {
        segment.publish(SimTime::ZERO)?;
        Ok(Self {
            now: SimTime::ZERO,
            segment: Some(segment),
        })
    }

    /// Move time forward by `delta` nanoseconds
    pub fn advance(&mut self, delta: Nanos) -> ShmResult<SimTime> {
        self.now = self.now.advanced_by(delta);
        if let Some(ref segment) = self.segment {
            segment.publish(self.now)?;
        }
        Ok(self.now)
    }

    pub fn snapshot(&self) -> SimTime {
        self.now
    }

    /// Name workers use to attach, if the clock is shared
    pub fn handle(&self) -> Option<&str> {
        self.segment.as_ref().map(ClockSegment::name)
    }

    /// Detach and release the shared segment, if any
    pub fn release(&mut self) -> ShmResult<()> {
        match self.segment.take() {
            Some(segment) => segment.release(),
            None => Ok(()),
        }
    }
}
