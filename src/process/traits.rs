/*!
 * Process Traits
 * Seam between the coordinator and the operating system
 */

use super::types::{ProcessResult, WorkerExit, WorkerRequest};
use crate::clock::SimTime;
use crate::core::types::WorkerId;

/// Launches worker processes and reports their exits
///
/// All methods except `terminate` must return immediately.
pub trait WorkerLauncher {
    /// Start a worker; the returned id identifies it in later exits
    fn spawn(&mut self, request: &WorkerRequest) -> ProcessResult<WorkerId>;

    /// Check once, without blocking, for any exited worker
    ///
    /// `Ok(None)` means nothing has exited yet.
    fn try_reap(&mut self, now: SimTime) -> ProcessResult<Option<WorkerExit>>;

    /// Ask a worker to stop and wait for it to exit
    fn terminate(&mut self, worker: WorkerId) -> ProcessResult<WorkerExit>;
}
