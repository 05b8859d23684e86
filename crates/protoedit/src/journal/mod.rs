//! Journaled buffers.
//!
//! A [`Journal`] owns a [`Buffer`] and an append-only log of the size changes
//! made to it. Views remember the journal version their offsets were computed
//! at and catch up by replaying the entries logged since ([`Journal::align`]).
//!
//! The journal is single-threaded: it uses interior mutability so that many
//! views can share one `&Journal`, which makes it `!Sync`.

pub mod allocator;
pub mod buffer;
pub mod offset;

use std::cell::{Ref, RefCell};

use tracing::trace;

pub use allocator::{Allocator, BoundedAllocator, NullAllocator, SYSTEM, SystemAllocator};
pub use buffer::Buffer;
pub use offset::{Diff, Entry, Offset};

use crate::error::{Error, Result};
use offset::{Replay, distance};

/// Version marking a view as invalidated.
pub const INVALID_VERSION: usize = usize::MAX;

/// A buffer together with the log of every size change made to it.
#[derive(Debug)]
pub struct Journal<'a> {
    buffer: RefCell<Buffer<'a>>,
    entries: RefCell<Vec<Entry>>,
}

impl Journal<'static> {
    /// Creates a journal over a copy of `data`.
    pub fn new(data: &[u8]) -> Result<Self> {
        Ok(Self::from_buffer(Buffer::new(data)?))
    }

    /// Creates a journal over an empty buffer.
    pub fn empty() -> Self {
        Self::from_buffer(Buffer::empty())
    }
}

impl<'a> Journal<'a> {
    /// Creates a journal over a copy of `data` allocated through `allocator`.
    pub fn with_allocator(data: &[u8], allocator: &'a dyn Allocator) -> Result<Self> {
        Ok(Self::from_buffer(Buffer::with_allocator(data, allocator)?))
    }

    /// Creates a journal over caller-owned memory. Only same-size edits succeed.
    pub fn zero_copy(data: &'a mut [u8]) -> Self {
        Self::from_buffer(Buffer::zero_copy(data))
    }

    pub fn from_buffer(buffer: Buffer<'a>) -> Self {
        Self {
            buffer: RefCell::new(buffer),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Returns the number of entries logged so far.
    pub fn version(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns the entry logged at `index`.
    pub fn entry(&self, index: usize) -> Option<Entry> {
        self.entries.borrow().get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.buffer.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_zero_copy(&self) -> bool {
        self.buffer.borrow().is_zero_copy()
    }

    /// Borrows the buffer contents.
    ///
    /// The returned guard must be dropped before the journal is written to.
    pub fn data(&self) -> Ref<'_, [u8]> {
        Ref::map(self.buffer.borrow(), Buffer::data)
    }

    /// Returns a copy of the buffer contents.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data().to_vec()
    }

    pub fn into_buffer(self) -> Buffer<'a> {
        self.buffer.into_inner()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.into_buffer().into_vec()
    }

    /// Replaces `[start, end)` with `data`, on behalf of the range starting at
    /// `origin`.
    ///
    /// Size-preserving writes are not logged. Otherwise the entry is logged
    /// first and removed again if the buffer write fails.
    pub fn write(&self, origin: usize, start: usize, end: usize, data: &[u8]) -> Result<()> {
        let delta = distance(end.saturating_sub(start), data.len())?;
        if delta == 0 {
            return self.buffer.borrow_mut().write(start, end, data);
        }
        if origin > end {
            return Err(Error::Offset {
                start: origin,
                end,
                size: self.len(),
            });
        }
        self.log(Entry::new(origin, end, delta))?;
        if let Err(err) = self.buffer.borrow_mut().write(start, end, data) {
            self.entries.borrow_mut().pop();
            trace!(origin, offset = end, delta, error = %err, "journal entry rolled back");
            return Err(err);
        }
        Ok(())
    }

    /// Removes `[start, end)` on behalf of the range starting at `origin`.
    pub fn clear(&self, origin: usize, start: usize, end: usize) -> Result<()> {
        self.write(origin, start, end, &[])
    }

    /// Appends an entry without touching the buffer.
    pub(crate) fn log(&self, entry: Entry) -> Result<()> {
        let mut entries = self.entries.borrow_mut();
        entries
            .try_reserve(1)
            .map_err(|_| Error::Alloc {
                size: std::mem::size_of::<Entry>(),
            })?;
        entries.push(entry);
        trace!(
            origin = entry.origin,
            offset = entry.offset,
            delta = entry.delta,
            version = entries.len(),
            "journal entry logged"
        );
        Ok(())
    }

    /// Replays every entry logged since `since`, continuing past removals.
    ///
    /// Returns true if any entry removed the range. Used for scan positions,
    /// which stay meaningful after the range they pointed at is gone.
    pub(crate) fn replay(&self, since: usize, offset: &mut Offset) -> Result<bool> {
        let entries = self.entries.borrow();
        let mut removed = false;
        for entry in entries.get(since..).unwrap_or_default() {
            removed |= offset.apply(entry)? == Replay::Invalidated;
        }
        Ok(removed)
    }

    /// Brings `offset`, valid at `version`, up to the current version.
    ///
    /// Replaying zero entries is a no-op. If any entry removed the range,
    /// `version` becomes [`INVALID_VERSION`] and the range is collapsed.
    pub fn align(&self, version: &mut usize, offset: &mut Offset) -> Result<()> {
        if *version == INVALID_VERSION {
            return Err(Error::invalidated());
        }
        let entries = self.entries.borrow();
        if *version > entries.len() {
            return Err(Error::Invalid {
                context: "view is ahead of its journal",
            });
        }
        for entry in &entries[*version..] {
            if offset.apply(entry)? == Replay::Invalidated {
                *version = INVALID_VERSION;
                return Err(Error::invalidated());
            }
        }
        *version = entries.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_replays_entries() {
        let journal = Journal::empty();
        for e in 0..32usize {
            journal.log(Entry::new(e, e, e as isize + 2)).unwrap();
        }
        let mut version = 0;
        let mut offset = Offset::default();
        journal.align(&mut version, &mut offset).unwrap();
        assert_eq!(version, 32);
        assert_eq!(offset.end, 560);
    }

    #[test]
    fn test_align_is_idempotent() {
        let journal = Journal::new(b"abcdef").unwrap();
        journal.write(0, 1, 2, b"xyz").unwrap();
        let mut version = 0;
        let mut offset = Offset::new(3, 6);
        journal.align(&mut version, &mut offset).unwrap();
        let aligned = offset;
        journal.align(&mut version, &mut offset).unwrap();
        assert_eq!(offset, aligned);
        assert_eq!(version, 1);
        assert_eq!((offset.start, offset.end), (5, 8));
    }

    #[test]
    fn test_same_size_write_is_not_logged() {
        let journal = Journal::new(b"abcd").unwrap();
        journal.write(0, 1, 3, b"XY").unwrap();
        assert_eq!(journal.version(), 0);
        assert_eq!(&*journal.data(), b"aXYd");
    }

    #[test]
    fn test_failed_write_rolls_back_entry() {
        let alloc = BoundedAllocator::new(4);
        let journal = Journal::with_allocator(b"abcd", &alloc).unwrap();
        assert!(matches!(journal.write(0, 0, 0, b"toolong"), Err(Error::Alloc { .. })));
        assert_eq!(journal.version(), 0);
        assert_eq!(journal.to_vec(), b"abcd");
    }

    #[test]
    fn test_zero_copy_journal() {
        let mut raw = *b"abcd";
        let journal = Journal::zero_copy(&mut raw);
        assert!(matches!(journal.write(0, 0, 1, b""), Err(Error::ZeroCopy)));
        assert_eq!(journal.version(), 0);
        journal.write(0, 0, 1, b"z").unwrap();
        assert_eq!(journal.into_bytes(), b"zbcd");
    }

    #[test]
    fn test_invalidated_offset_stays_invalid() {
        let journal = Journal::new(b"\x0a\x02hi").unwrap();
        let mut offset = Offset {
            start: 2,
            end: 4,
            diff: Diff {
                origin: -2,
                tag: -2,
                length: -1,
            },
        };
        let mut version = 0;
        journal.clear(0, 0, 4).unwrap();
        assert!(journal.align(&mut version, &mut offset).is_err());
        assert_eq!(version, INVALID_VERSION);
        assert!(journal.align(&mut version, &mut offset).is_err());
    }
}
