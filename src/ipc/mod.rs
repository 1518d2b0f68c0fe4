/*!
 * IPC Module
 * Inter-process communication between the coordinator and its workers
 */

pub mod shm;

// Re-export for convenience
pub use shm::{ClockSegment, ShmError, ShmPermission, ShmResult};
