/*!
 * Shared Memory Types
 * Segment layout, permissions, and errors
 */

use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use std::mem::size_of;
use std::sync::atomic::AtomicU32;
use thiserror::Error;

/// Shared memory operation result
pub type ShmResult<T> = Result<T, ShmError>;

/// Shared memory error types
#[derive(Debug, Error)]
pub enum ShmError {
    /// Segment could not be created
    #[error("Failed to create segment {name}: {source}")]
    Create {
        name: String,
        #[source]
        source: Errno,
    },

    /// Segment could not be opened for attachment
    #[error("Failed to attach segment {name}: {source}")]
    Attach {
        name: String,
        #[source]
        source: Errno,
    },

    /// Segment could not be sized
    #[error("Failed to size segment {name} to {size} bytes: {source}")]
    Resize {
        name: String,
        size: usize,
        #[source]
        source: Errno,
    },

    /// Segment could not be mapped into the address space
    #[error("Failed to map segment {name}: {source}")]
    Map {
        name: String,
        #[source]
        source: Errno,
    },

    /// Existing segment is smaller than the clock layout
    #[error("Invalid segment size for {name}: {actual} bytes, expected at least {expected}")]
    InvalidSize {
        name: String,
        actual: u64,
        expected: usize,
    },

    /// Write attempted through a read-only attachment
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Segment could not be unmapped or removed
    #[error("Failed to release segment {name}: {source}")]
    Release {
        name: String,
        #[source]
        source: Errno,
    },
}

/// Shared memory permission types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShmPermission {
    /// Read and write access (the creator)
    ReadWrite,
    /// Read-only access (workers)
    ReadOnly,
}

impl ShmPermission {
    /// Check if this permission allows writing
    pub fn can_write(&self) -> bool {
        matches!(self, ShmPermission::ReadWrite)
    }
}

/// Binary layout of the clock segment
///
/// Two consecutive native 32-bit unsigned integers: seconds, then
/// nanoseconds. No header and no version field. Fields are independent
/// atomics, so a reader may observe one field updated and the other not.
#[repr(C)]
#[derive(Debug, Default)]
pub struct ClockCell {
    pub seconds: AtomicU32,
    pub nanoseconds: AtomicU32,
}

/// Size in bytes of the clock segment
pub const SEGMENT_SIZE: usize = size_of::<ClockCell>();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_two_u32() {
        assert_eq!(SEGMENT_SIZE, 2 * size_of::<u32>());
        assert_eq!(std::mem::align_of::<ClockCell>(), std::mem::align_of::<u32>());
    }

    #[test]
    fn test_permission_write() {
        assert!(ShmPermission::ReadWrite.can_write());
        assert!(!ShmPermission::ReadOnly.can_write());
    }
}
