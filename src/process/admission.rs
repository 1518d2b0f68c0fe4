/*!
 * Launch Admission
 * Per-tick gate deciding whether a new worker may start
 */

use super::table::ProcessTable;
use super::traits::WorkerLauncher;
use super::types::{ProcessResult, WorkerRequest};
use crate::clock::SimTime;
use crate::core::config::RunConfig;
use crate::core::types::{SlotIndex, WorkerId};
use serde::Serialize;
use tracing::{debug, error};

/// Launch and occupancy counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub launched: u32,
    pub running: u32,
}

/// Outcome of evaluating the admission conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// All conditions hold; launch into this slot
    Admit(SlotIndex),
    /// Every requested worker has been launched
    Exhausted,
    /// The concurrency ceiling is reached
    AtCeiling,
    /// The minimum interval since the last launch has not elapsed
    Throttled,
    /// No free slot in the process table
    TableFull,
}

/// A successful launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Launched {
    pub worker: WorkerId,
    pub slot: SlotIndex,
    pub started: SimTime,
}

/// Interval-based launch gate
#[derive(Debug, Clone)]
pub struct LaunchAdmission {
    last_launch: SimTime,
}

impl LaunchAdmission {
    /// Gate whose first launch is measured from time zero
    pub fn new() -> Self {
        Self {
            last_launch: SimTime::ZERO,
        }
    }

    pub fn last_launch(&self) -> SimTime {
        self.last_launch
    }

    /// Check the admission conditions without side effects
    pub fn evaluate<const N: usize>(
        &self,
        config: &RunConfig,
        table: &ProcessTable<N>,
        now: SimTime,
        counters: RunCounters,
    ) -> Admission {
        if counters.launched >= config.total_workers {
            return Admission::Exhausted;
        }
        if counters.running >= config.max_concurrent {
            return Admission::AtCeiling;
        }
        if now.elapsed_since(self.last_launch) < config.launch_interval {
            return Admission::Throttled;
        }
        match table.allocate() {
            Some(slot) => Admission::Admit(slot),
            None => Admission::TableFull,
        }
    }

    /// Launch one worker if every condition holds
    ///
    /// Returns `Ok(None)` when the tick is not admitted. A spawn failure is
    /// returned as an error and leaves the table untouched.
    pub fn try_launch<L, const N: usize>(
        &mut self,
        config: &RunConfig,
        table: &mut ProcessTable<N>,
        now: SimTime,
        counters: &mut RunCounters,
        launcher: &mut L,
        segment: Option<&str>,
    ) -> ProcessResult<Option<Launched>>
    where
        L: WorkerLauncher + ?Sized,
    {
        let slot = match self.evaluate(config, table, now, *counters) {
            Admission::Admit(slot) => slot,
            _ => return Ok(None),
        };

        let request = WorkerRequest {
            budget: config.worker_budget,
            segment: segment.map(str::to_string),
            issued_at: now,
        };
        let worker = launcher.spawn(&request).map_err(|e| {
            error!(slot, error = %e, "Worker spawn failed");
            e
        })?;

        table.occupy(slot, worker, now)?;
        counters.launched += 1;
        counters.running += 1;
        self.last_launch = now;

        debug!(
            worker_id = worker,
            slot,
            seconds = now.seconds,
            nanoseconds = now.nanoseconds,
            launched = counters.launched,
            running = counters.running,
            "Launched worker"
        );

        Ok(Some(Launched {
            worker,
            slot,
            started: now,
        }))
    }
}

impl Default for LaunchAdmission {
    fn default() -> Self {
        Self::new()
    }
}
