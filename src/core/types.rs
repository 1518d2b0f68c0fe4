/*!
 * Core Types
 * Common types used across the orchestrator
 */

/// OS process identifier of a worker
pub type WorkerId = u32;

/// Index into the process table
pub type SlotIndex = usize;

/// Simulated nanoseconds (used for deltas and intervals)
pub type Nanos = u64;
