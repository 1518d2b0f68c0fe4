/*!
 * OSS Kernel Library
 * Simulated-clock process orchestrator exposed as a library
 */

pub mod cli;
pub mod clock;
pub mod coordinator;
pub mod core;
pub mod ipc;
pub mod monitoring;
pub mod process;
pub mod signals;

// Re-exports
pub use clock::{RunTotals, SimClock, SimTime};
pub use coordinator::{Coordinator, CoordinatorState, RunSummary};
pub use crate::core::{ConfigError, CoordinatorSettings, OssError, OssResult, RunConfig};
pub use ipc::{ClockSegment, ShmError};
pub use monitoring::init_tracing;
pub use process::{ProcessExecutor, ProcessTable, WorkerLauncher};
pub use signals::{ShutdownReason, ShutdownToken};
