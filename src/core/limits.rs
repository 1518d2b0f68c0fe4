/*!
 * System Limits and Constants
 *
 * Fixed values shared by the coordinator, the process table and the worker.
 */

use std::time::Duration;

// =============================================================================
// SIMULATED TIME
// =============================================================================

/// Nanoseconds per simulated second
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Simulated time added to the clock on every coordinator tick (1ms)
pub const TICK_NANOS: u64 = 1_000_000;

/// Simulated time between process table reports (0.5s)
pub const REPORT_INTERVAL_NANOS: u64 = 500_000_000;

// =============================================================================
// PROCESS TABLE
// =============================================================================

/// Number of slots in the process table
pub const MAX_PROCS: usize = 20;

// =============================================================================
// SAFETY
// =============================================================================

/// Real (wall clock) time after which the run is forcibly terminated
pub const SAFETY_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// DEFAULT RUN CONFIGURATION
// =============================================================================

pub const DEFAULT_TOTAL_WORKERS: i64 = 5;
pub const DEFAULT_MAX_CONCURRENT: i64 = 2;
pub const DEFAULT_WORKER_BUDGET_SECS: f64 = 3.0;
pub const DEFAULT_LAUNCH_INTERVAL_SECS: f64 = 0.1;

// =============================================================================
// SHARED MEMORY
// =============================================================================

/// Prefix of the POSIX shared memory object holding the clock
pub const SEGMENT_NAME_PREFIX: &str = "/oss-clock-";
