/*!
 * Shared Memory Module
 * Cross-process clock segment: one writer, many readers
 */

pub mod segment;
pub mod types;

// Re-export public API
pub use segment::ClockSegment;
pub use types::{ClockCell, ShmError, ShmPermission, ShmResult, SEGMENT_SIZE};
