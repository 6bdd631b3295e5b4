use log::debug;
use std::path::PathBuf;

use super::data::{EntryId, ImageEntry};
use crate::error::{Result, SessionError};
use crate::validation::{Gateway, MetadataDecoder, Renderer, Validation};

/// Direction of travel around the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Next,
    Previous,
}

impl NavDirection {
    pub fn reversed(self) -> Self {
        match self {
            NavDirection::Next => NavDirection::Previous,
            NavDirection::Previous => NavDirection::Next,
        }
    }
}

/// Result of a successful step
#[derive(Debug)]
pub struct Step<H> {
    /// The navigable entry that was reached
    pub id: EntryId,
    /// Display handle, when the render check ran during this step
    pub handle: Option<H>,
}

/// One arena slot. `entry` is `None` once the entry has been evicted.
#[derive(Debug)]
struct Slot {
    entry: Option<ImageEntry>,
    next: usize,
    prev: usize,
}

/// Circular doubly-linked list of image entries
///
/// Entries live in an arena indexed by their id; links are indices. Evicting
/// an entry relinks its neighbors and tombstones its slot, so ids held by
/// callers never dangle: they simply stop resolving.
#[derive(Debug)]
pub struct Ring {
    slots: Vec<Slot>,
    head: usize,
    len: usize,
}

impl Ring {
    /// Build a ring from paths in directory order
    ///
    /// Returns `None` when `paths` is empty.
    pub fn from_paths(paths: Vec<PathBuf>, aspect: f64) -> Option<Self> {
        let count = paths.len();
        if count == 0 {
            return None;
        }

        let slots = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Slot {
                entry: Some(ImageEntry::new(EntryId(index), path, aspect)),
                next: (index + 1) % count,
                prev: (index + count - 1) % count,
            })
            .collect();

        Some(Ring {
            slots,
            head: 0,
            len: count,
        })
    }

    /// Number of entries still linked
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lowest-id entry still linked
    pub fn first(&self) -> EntryId {
        EntryId(self.head)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: EntryId) -> Option<&ImageEntry> {
        self.slots.get(id.0).and_then(|slot| slot.entry.as_ref())
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut ImageEntry> {
        self.slots.get_mut(id.0).and_then(|slot| slot.entry.as_mut())
    }

    /// Neighbor of a linked entry
    pub fn neighbor(&self, id: EntryId, direction: NavDirection) -> Option<EntryId> {
        let slot = self.slots.get(id.0).filter(|slot| slot.entry.is_some())?;
        Some(match direction {
            NavDirection::Next => EntryId(slot.next),
            NavDirection::Previous => EntryId(slot.prev),
        })
    }

    /// Unlink an entry and hand it back
    ///
    /// Returns `Ok(None)` if the entry was already evicted. Removing the last
    /// remaining entry is refused with [`SessionError::Exhausted`] and leaves
    /// the ring untouched.
    pub fn remove(&mut self, id: EntryId) -> Result<Option<ImageEntry>> {
        let Some(slot) = self.slots.get(id.0) else {
            return Ok(None);
        };
        if slot.entry.is_none() {
            return Ok(None);
        }
        if self.len == 1 {
            return Err(SessionError::Exhausted);
        }

        let (prev, next) = (slot.prev, slot.next);
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
        self.len -= 1;

        if self.head == id.0 {
            // Ids ascend along `next` except at the wrap, so the new head is
            // whichever linked entry has the smallest id.
            self.head = self.lowest_linked_from(next);
        }

        let entry = self.slots[id.0].entry.take();
        if let Some(entry) = &entry {
            debug!("🗑️  Removed {} from ring ({} left)", entry.path.display(), self.len);
        }
        Ok(entry)
    }

    /// Entries in link order, starting at `start` and going once around
    pub fn iter_from(&self, start: EntryId) -> impl Iterator<Item = &ImageEntry> + '_ {
        let mut cursor = self.get(start).map(|_| start.0);
        let mut remaining = self.len;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let index = cursor?;
            remaining -= 1;
            cursor = Some(self.slots[index].next);
            self.slots[index].entry.as_ref()
        })
    }

    /// Walk from `from` toward `direction` until a navigable entry is found
    ///
    /// Unvalidated neighbors are validated on the way; failures are evicted
    /// and the neighbor is re-read from the relinked ring. Each failed
    /// attempt removes one entry, so the walk is bounded by the ring length.
    /// If the walk comes back around to `from`, `from` itself is the answer.
    pub fn step_and_validate<D, R>(
        &mut self,
        from: EntryId,
        direction: NavDirection,
        gateway: &mut Gateway<D, R>,
    ) -> Result<Step<R::Handle>>
    where
        D: MetadataDecoder,
        R: Renderer,
    {
        let bound = self.len;
        for _ in 0..=bound {
            let candidate = self
                .neighbor(from, direction)
                .ok_or(SessionError::UnknownEntry(from.0))?;

            match gateway.validate(self, candidate)? {
                Validation::Navigable(handle) => {
                    return Ok(Step {
                        id: candidate,
                        handle,
                    })
                }
                Validation::Evicted => continue,
            }
        }

        Err(SessionError::Exhausted)
    }

    fn lowest_linked_from(&self, start: usize) -> usize {
        let mut lowest = start;
        let mut cursor = self.slots[start].next;
        while cursor != start {
            lowest = lowest.min(cursor);
            cursor = self.slots[cursor].next;
        }
        lowest
    }

    /// Panics unless every linked entry is linked both ways
    #[cfg(test)]
    pub(crate) fn assert_linked(&self) {
        let mut seen = 0;
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.entry.is_none() {
                continue;
            }
            seen += 1;
            assert!(self.slots[slot.next].entry.is_some(), "{} links to an evicted next", index);
            assert!(self.slots[slot.prev].entry.is_some(), "{} links to an evicted prev", index);
            assert_eq!(self.slots[slot.next].prev, index, "next.prev != self at {}", index);
            assert_eq!(self.slots[slot.prev].next, index, "prev.next != self at {}", index);
        }
        assert_eq!(seen, self.len);
        assert_eq!(self.iter_from(self.first()).count(), self.len);
    }
}
