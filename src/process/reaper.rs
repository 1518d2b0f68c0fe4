/*!
 * Reaper
 * Non-blocking collection of exited workers and runtime accounting
 */

use super::table::ProcessTable;
use super::traits::WorkerLauncher;
use super::types::{ExitKind, ProcessResult};
use crate::clock::{RunTotals, SimTime};
use crate::core::types::{SlotIndex, WorkerId};
use serde::Serialize;
use tracing::{debug, warn};

/// A worker whose slot was reclaimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReapedWorker {
    pub worker: WorkerId,
    pub slot: SlotIndex,
    pub started: SimTime,
    pub reaped_at: SimTime,
    pub runtime: SimTime,
    pub status: ExitKind,
}

/// Result of one non-blocking reap check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// A tracked worker exited and its slot was freed
    Reaped(ReapedWorker),
    /// An exit arrived for a worker not occupying any slot; ignored
    Unmatched(WorkerId),
}

/// Collects exited workers and accumulates their simulated runtime
#[derive(Debug, Default)]
pub struct Reaper {
    totals: RunTotals,
    reaped: u32,
    unmatched: u32,
}

impl Reaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Perform exactly one non-blocking check for an exited worker
    ///
    /// `Ok(None)` means nothing is ready this tick.
    pub fn reap_once<L, const N: usize>(
        &mut self,
        launcher: &mut L,
        table: &mut ProcessTable<N>,
        now: SimTime,
    ) -> ProcessResult<Option<ReapOutcome>>
    where
        L: WorkerLauncher + ?Sized,
    {
        let Some(exit) = launcher.try_reap(now)? else {
            return Ok(None);
        };

        let Some(slot) = table.find(exit.worker) else {
            self.unmatched += 1;
            warn!(worker_id = exit.worker, "Exit for untracked worker ignored");
            return Ok(Some(ReapOutcome::Unmatched(exit.worker)));
        };

        Ok(self
            .reclaim(table, slot, now, exit.status)
            .map(ReapOutcome::Reaped))
    }

    /// Reap until no exited worker is pending
    pub fn drain<L, const N: usize>(
        &mut self,
        launcher: &mut L,
        table: &mut ProcessTable<N>,
        now: SimTime,
    ) -> ProcessResult<Vec<ReapedWorker>>
    where
        L: WorkerLauncher + ?Sized,
    {
        let mut reaped = Vec::new();
        while let Some(outcome) = self.reap_once(launcher, table, now)? {
            if let ReapOutcome::Reaped(worker) = outcome {
                reaped.push(worker);
            }
        }
        Ok(reaped)
    }

    /// Terminate every worker still holding a slot and account its runtime
    ///
    /// Used on cancellation; a worker that cannot be signalled still has its
    /// slot freed.
    pub fn evict_all<L, const N: usize>(
        &mut self,
        launcher: &mut L,
        table: &mut ProcessTable<N>,
        now: SimTime,
    ) -> Vec<ReapedWorker>
    where
        L: WorkerLauncher + ?Sized,
    {
        let occupied: Vec<(SlotIndex, WorkerId)> = table
            .iter_occupied()
            .map(|(slot, o)| (slot, o.worker))
            .collect();

        let mut evicted = Vec::with_capacity(occupied.len());
        for (slot, worker) in occupied {
            let status = match launcher.terminate(worker) {
                Ok(exit) => exit.status,
                Err(e) => {
                    warn!(
                        worker_id = worker,
                        error = %e,
                        "Failed to terminate worker during shutdown"
                    );
                    ExitKind::Signaled(nix::sys::signal::Signal::SIGTERM as i32)
                }
            };
            if let Some(reaped) = self.reclaim(table, slot, now, status) {
                evicted.push(reaped);
            }
        }
        evicted
    }

    fn reclaim<const N: usize>(
        &mut self,
        table: &mut ProcessTable<N>,
        slot: SlotIndex,
        now: SimTime,
        status: ExitKind,
    ) -> Option<ReapedWorker> {
        let occupant = table.release(slot)?;
        let runtime = now.elapsed_since(occupant.started);
        self.totals.accumulate(runtime);
        self.reaped += 1;

        debug!(
            worker_id = occupant.worker,
            slot,
            runtime_s = runtime.seconds,
            runtime_ns = runtime.nanoseconds,
            "Reaped worker"
        );

        Some(ReapedWorker {
            worker: occupant.worker,
            slot,
            started: occupant.started,
            reaped_at: now,
            runtime,
            status,
        })
    }

    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn reaped(&self) -> u32 {
        self.reaped
    }

    pub fn unmatched(&self) -> u32 {
        self.unmatched
    }
}
