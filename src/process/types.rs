/*!
 * Process Types
 * Worker launch requests, exit notifications, and errors
 */

use crate::clock::SimTime;
use crate::core::types::{SlotIndex, WorkerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Spawn failed: {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Reap failed: {0}")]
    ReapFailed(String),

    #[error("Slot {slot} already occupied by worker {worker}")]
    SlotOccupied { slot: SlotIndex, worker: WorkerId },

    #[error("Slot {slot} out of range (capacity {capacity})")]
    SlotOutOfRange { slot: SlotIndex, capacity: usize },

    #[error("Failed to signal worker {worker}: {reason}")]
    SignalFailed { worker: WorkerId, reason: String },
}

/// Everything a worker needs at launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRequest {
    /// Simulated runtime budget
    pub budget: SimTime,
    /// Name of the shared clock segment, if the clock is shared
    pub segment: Option<String>,
    /// Clock value when the request was issued
    pub issued_at: SimTime,
}

impl WorkerRequest {
    /// Positional worker arguments: seconds, nanoseconds, segment
    pub fn args(&self) -> Option<[String; 3]> {
        let segment = self.segment.as_ref()?;
        Some([
            self.budget.seconds.to_string(),
            self.budget.nanoseconds.to_string(),
            segment.clone(),
        ])
    }
}

/// How a worker process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ExitKind {
    /// Exited normally with a status code
    Exited(i32),
    /// Killed by a signal
    Signaled(i32),
}

impl ExitKind {
    pub fn is_success(&self) -> bool {
        matches!(self, ExitKind::Exited(0))
    }
}

/// A worker exit observed by the launcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerExit {
    pub worker: WorkerId,
    pub status: ExitKind,
}
