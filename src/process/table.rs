/*!
 * Process Table
 * Fixed-capacity slot array tracking live workers
 */

use super::types::{ProcessError, ProcessResult};
use crate::clock::SimTime;
use crate::core::limits::MAX_PROCS;
use crate::core::types::{SlotIndex, WorkerId};
use serde::Serialize;

/// A live worker assigned to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupant {
    pub worker: WorkerId,
    pub started: SimTime,
}

/// One slot of the process table
///
/// The worker id and start time exist only while the slot is occupied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessTableEntry {
    occupant: Option<Occupant>,
}

impl ProcessTableEntry {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn occupant(&self) -> Option<&Occupant> {
        self.occupant.as_ref()
    }

    pub fn worker(&self) -> Option<WorkerId> {
        self.occupant.map(|o| o.worker)
    }
}

/// Process table with `N` slots
///
/// A full table is backpressure, not an error: `allocate` returns `None`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessTable<const N: usize = MAX_PROCS> {
    #[serde(with = "entries")]
    entries: [ProcessTableEntry; N],
}

impl<const N: usize> ProcessTable<N> {
    pub fn new() -> Self {
        Self {
            entries: [ProcessTableEntry::default(); N],
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// First free slot, scanning from the front
    pub fn allocate(&self) -> Option<SlotIndex> {
        self.entries.iter().position(|e| !e.is_occupied())
    }

    /// Assign `worker` to `slot`, refusing to overwrite a live worker
    pub fn occupy(
        &mut self,
        slot: SlotIndex,
        worker: WorkerId,
        started: SimTime,
    ) -> ProcessResult<()> {
        let entry = self
            .entries
            .get_mut(slot)
            .ok_or(ProcessError::SlotOutOfRange { slot, capacity: N })?;
        if let Some(current) = entry.occupant {
            return Err(ProcessError::SlotOccupied {
                slot,
                worker: current.worker,
            });
        }
        entry.occupant = Some(Occupant { worker, started });
        Ok(())
    }

    /// Slot currently held by `worker`
    pub fn find(&self, worker: WorkerId) -> Option<SlotIndex> {
        self.entries
            .iter()
            .position(|e| e.worker() == Some(worker))
    }

    /// Free `slot`, returning whoever held it
    pub fn release(&mut self, slot: SlotIndex) -> Option<Occupant> {
        self.entries.get_mut(slot).and_then(|e| e.occupant.take())
    }

    pub fn get(&self, slot: SlotIndex) -> Option<&ProcessTableEntry> {
        self.entries.get(slot)
    }

    pub fn occupied(&self) -> usize {
        self.entries.iter().filter(|e| e.is_occupied()).count()
    }

    pub fn is_full(&self) -> bool {
        self.allocate().is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    pub fn entries(&self) -> &[ProcessTableEntry] {
        &self.entries
    }

    /// Occupied slots with their occupants
    pub fn iter_occupied(&self) -> impl Iterator<Item = (SlotIndex, &Occupant)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| e.occupant().map(|o| (slot, o)))
    }
}

impl<const N: usize> Default for ProcessTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

// serde only derives for arrays up to 32 elements; serialize as a sequence.
mod entries {
    use super::ProcessTableEntry;
    use serde::Serializer;

    pub fn serialize<S: Serializer, const N: usize>(
        entries: &[ProcessTableEntry; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(entries.iter())
    }
}
