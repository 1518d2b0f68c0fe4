/*!
 * Clock Segment
 * POSIX shared memory object carrying the simulated clock
 */

use super::types::{ClockCell, ShmError, ShmPermission, ShmResult, SEGMENT_SIZE};
use crate::clock::SimTime;
use crate::core::limits::SEGMENT_NAME_PREFIX;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::ftruncate;
use std::ffi::c_void;
use std::fs::File;
use std::num::NonZeroUsize;
use std::ptr::NonNull;
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shared clock segment mapped into this process
///
/// The creator holds [`ShmPermission::ReadWrite`] and removes the object on
/// release. Attached readers only unmap.
pub struct ClockSegment {
    name: String,
    cell: NonNull<ClockCell>,
    permission: ShmPermission,
    released: bool,
}

// SAFETY: the mapping is only accessed through the atomic fields of `ClockCell`
// and stays valid until `release`/`drop`, both of which take ownership.
unsafe impl Send for ClockSegment {}

impl ClockSegment {
    /// Create a new, zeroed segment with a unique name
    pub fn create() -> ShmResult<Self> {
        let name = format!("{}{}", SEGMENT_NAME_PREFIX, Uuid::new_v4().simple());
        Self::create_named(&name)
    }

    /// Create a new, zeroed segment under `name`
    ///
    /// Fails if an object with that name already exists. Anything acquired
    /// before a failure is released again.
    pub fn create_named(name: &str) -> ShmResult<Self> {
        let fd = shm_open(
            name,
            OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
            Mode::S_IRUSR | Mode::S_IWUSR,
        )
        .map_err(|source| ShmError::Create {
            name: name.to_string(),
            source,
        })?;
        let file = File::from(fd);

        if let Err(source) = ftruncate(&file, SEGMENT_SIZE as nix::libc::off_t) {
            discard(name);
            return Err(ShmError::Resize {
                name: name.to_string(),
                size: SEGMENT_SIZE,
                source,
            });
        }

        let cell = match map(&file, ProtFlags::PROT_READ | ProtFlags::PROT_WRITE) {
            Ok(cell) => cell,
            Err(source) => {
                discard(name);
                return Err(ShmError::Map {
                    name: name.to_string(),
                    source,
                });
            }
        };

        let segment = Self {
            name: name.to_string(),
            cell,
            permission: ShmPermission::ReadWrite,
            released: false,
        };
        segment.cell().seconds.store(0, Ordering::Relaxed);
        segment.cell().nanoseconds.store(0, Ordering::Relaxed);

        info!(segment = %segment.name, size = SEGMENT_SIZE, "Created clock segment");
        Ok(segment)
    }

    /// Attach read-only to an existing segment
    pub fn attach(name: &str) -> ShmResult<Self> {
        let fd = shm_open(name, OFlag::O_RDONLY, Mode::empty()).map_err(|source| {
            ShmError::Attach {
                name: name.to_string(),
                source,
            }
        })?;
        let file = File::from(fd);

        let actual = file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| ShmError::Attach {
                name: name.to_string(),
                source: e.raw_os_error().map(Errno::from_raw).unwrap_or(Errno::EIO),
            })?;
        if actual < SEGMENT_SIZE as u64 {
            return Err(ShmError::InvalidSize {
                name: name.to_string(),
                actual,
                expected: SEGMENT_SIZE,
            });
        }

        let cell = map(&file, ProtFlags::PROT_READ).map_err(|source| ShmError::Map {
            name: name.to_string(),
            source,
        })?;

        debug!(segment = %name, "Attached to clock segment");
        Ok(Self {
            name: name.to_string(),
            cell,
            permission: ShmPermission::ReadOnly,
            released: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permission(&self) -> ShmPermission {
        self.permission
    }

    /// Read the clock currently stored in the segment
    ///
    /// The two fields are loaded independently and may be torn.
    pub fn read(&self) -> SimTime {
        let cell = self.cell();
        SimTime {
            seconds: cell.seconds.load(Ordering::Relaxed),
            nanoseconds: cell.nanoseconds.load(Ordering::Relaxed),
        }
    }

    /// Store a new clock value
    ///
    /// Nanoseconds are stored before seconds, so a torn read can only look
    /// earlier than the published value, never later.
    pub fn publish(&self, time: SimTime) -> ShmResult<()> {
        if !self.permission.can_write() {
            return Err(ShmError::PermissionDenied(format!(
                "segment {} is attached read-only",
                self.name
            )));
        }
        let cell = self.cell();
        cell.nanoseconds.store(time.nanoseconds, Ordering::Relaxed);
        cell.seconds.store(time.seconds, Ordering::Relaxed);
        Ok(())
    }

    /// Detach from the segment, removing it if this process created it
    pub fn release(mut self) -> ShmResult<()> {
        self.released = true;
        self.unmap_and_unlink()
    }

    fn unmap_and_unlink(&mut self) -> ShmResult<()> {
        // SAFETY: `cell` came from a successful mmap of SEGMENT_SIZE bytes and
        // is unmapped exactly once, guarded by `released`.
        unsafe { munmap(self.cell.cast::<c_void>(), SEGMENT_SIZE) }.map_err(|source| {
            ShmError::Release {
                name: self.name.clone(),
                source,
            }
        })?;

        if self.permission == ShmPermission::ReadWrite {
            shm_unlink(self.name.as_str()).map_err(|source| ShmError::Release {
                name: self.name.clone(),
                source,
            })?;
            info!(segment = %self.name, "Released clock segment");
        } else {
            debug!(segment = %self.name, "Detached from clock segment");
        }
        Ok(())
    }

    fn cell(&self) -> &ClockCell {
        // SAFETY: the mapping is live for as long as `self` is, and
        // `ClockCell` only contains atomics, so shared references are sound
        // even while another process writes.
        unsafe { self.cell.as_ref() }
    }
}

impl Drop for ClockSegment {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.unmap_and_unlink() {
            warn!(segment = %self.name, error = %e, "Failed to release clock segment on drop");
        }
    }
}

impl std::fmt::Debug for ClockSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockSegment")
            .field("name", &self.name)
            .field("permission", &self.permission)
            .field("clock", &self.read())
            .finish()
    }
}

fn map(file: &File, prot: ProtFlags) -> nix::Result<NonNull<ClockCell>> {
    let length = NonZeroUsize::new(SEGMENT_SIZE).ok_or(Errno::EINVAL)?;
    // SAFETY: a fresh shared mapping of a file descriptor we own; no existing
    // Rust object aliases the returned address.
    let ptr = unsafe { mmap(None, length, prot, MapFlags::MAP_SHARED, file, 0) }?;
    Ok(ptr.cast::<ClockCell>())
}

fn discard(name: &str) {
    if let Err(e) = shm_unlink(name) {
        warn!(segment = %name, error = %e, "Failed to remove partially created segment");
    }
}
