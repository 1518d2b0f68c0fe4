/*!
 * Process Module
 * Worker lifecycle: admission, launch, occupancy tracking, and reaping
 */

pub mod admission;
pub mod executor;
pub mod reaper;
pub mod table;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use admission::{Admission, LaunchAdmission, Launched, RunCounters};
pub use executor::ProcessExecutor;
pub use reaper::{ReapOutcome, ReapedWorker, Reaper};
pub use table::{Occupant, ProcessTable, ProcessTableEntry};
pub use traits::WorkerLauncher;
pub use types::{ExitKind, ProcessError, ProcessResult, WorkerExit, WorkerRequest};
