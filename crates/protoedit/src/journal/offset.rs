//! Byte-range bookkeeping for views into a journaled buffer.
//!
//! All position arithmetic lives here. Positions are absolute indexes into
//! the journal's buffer; back-pointers are signed distances relative to the
//! start of the range they belong to.

use crate::error::{Error, Result};

/// Back-pointers of an [`Offset`], relative to its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Diff {
    /// Start of the enclosing message's value.
    pub origin: isize,
    /// Start of this range's tag. Zero if there is no tag.
    pub tag: isize,
    /// Start of this range's length prefix. Zero if there is none.
    pub length: isize,
}

/// The value range of one field or message occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    /// First byte of the value (after tag and length prefix).
    pub start: usize,
    /// One past the last byte of the value.
    pub end: usize,
    pub diff: Diff,
}

/// One logged size change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Start of the range that contained the cause of the edit.
    pub origin: usize,
    /// End of the edited range before the edit.
    pub offset: usize,
    /// Signed size change.
    pub delta: isize,
}

impl Entry {
    pub const fn new(origin: usize, offset: usize, delta: isize) -> Self {
        Self {
            origin,
            offset,
            delta,
        }
    }

    /// Returns true if the edit removed `[origin, offset)` without replacement.
    pub fn is_removal(&self) -> bool {
        self.offset.checked_add_signed(self.delta) == Some(self.origin)
    }
}

/// Outcome of replaying one entry against an offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    Untouched,
    Shifted,
    Resized,
    Invalidated,
}

/// Adds a signed distance to a position.
pub(crate) fn displace(pos: usize, delta: isize) -> Result<usize> {
    pos.checked_add_signed(delta).ok_or(Error::Overflow)
}

/// Signed distance from `from` to `to`.
pub(crate) fn distance(from: usize, to: usize) -> Result<isize> {
    let (hi, lo, sign) = if to >= from {
        (to, from, 1)
    } else {
        (from, to, -1)
    };
    isize::try_from(hi - lo)
        .map(|d| d * sign)
        .map_err(|_| Error::Overflow)
}

impl Offset {
    /// Creates an offset without back-pointers.
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            diff: Diff {
                origin: 0,
                tag: 0,
                length: 0,
            },
        }
    }

    /// Returns the size of the value in bytes.
    pub fn size(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Absolute start of the enclosing message's value.
    pub fn origin(&self) -> Result<usize> {
        displace(self.start, self.diff.origin)
    }

    /// Absolute start of the tag, or of the value if there is no tag.
    pub fn tag(&self) -> Result<usize> {
        displace(self.start, self.diff.tag)
    }

    /// Absolute start of the length prefix, if there is one.
    pub fn length(&self) -> Result<Option<usize>> {
        if self.diff.length == 0 {
            return Ok(None);
        }
        displace(self.start, self.diff.length).map(Some)
    }

    /// Collapses the range to an empty, detached position.
    pub(crate) fn collapse(&mut self, at: usize) {
        self.start = at;
        self.end = at;
        self.diff = Diff::default();
    }

    /// Replays one journal entry.
    ///
    /// Three cases are distinguished, most specific first: the edit happened
    /// before this range, inside it (including its own header), or it removed
    /// an enclosing range altogether. An edit that only resizes an ancestor
    /// after this range leaves it untouched.
    pub(crate) fn apply(&mut self, entry: &Entry) -> Result<Replay> {
        let origin = self.origin()?;

        // Before
        if entry.origin < self.start && entry.offset < self.end {
            self.shift(entry)?;
            return Ok(Replay::Shifted);
        }

        // Inside
        if entry.origin >= origin && entry.offset <= self.end {
            if entry.origin >= self.start {
                self.end = displace(self.end, entry.delta)?;
                return Ok(Replay::Resized);
            }
            if self.end.checked_add_signed(entry.delta) == Some(origin) {
                self.collapse(origin);
                return Ok(Replay::Invalidated);
            }
            if entry.is_removal() && entry.origin <= self.tag()? && entry.offset == self.end {
                self.collapse(entry.origin);
                return Ok(Replay::Invalidated);
            }
            if entry.origin > self.tag()? && entry.offset <= self.start {
                // Own length prefix rewritten while the value is empty
                self.shift(entry)?;
                return Ok(Replay::Shifted);
            }
            return Ok(Replay::Untouched);
        }

        // Outside
        if entry.origin <= origin && entry.is_removal() {
            self.collapse(entry.origin);
            return Ok(Replay::Invalidated);
        }

        Ok(Replay::Untouched)
    }

    /// Moves the whole range by the entry's delta. Back-pointers whose target
    /// lies before the end of the edit did not move, so they absorb the delta.
    ///
    /// The origin marks where a message's contents begin, so bytes inserted
    /// exactly there leave it in place. Tag and prefix positions move with
    /// bytes inserted at them.
    fn shift(&mut self, entry: &Entry) -> Result<()> {
        let start = self.start;
        self.start = displace(self.start, entry.delta)?;
        self.end = displace(self.end, entry.delta)?;

        let delta = entry.delta;
        let absorb = |diff: &mut isize, inclusive: bool| -> Result<()> {
            if *diff == 0 {
                return Ok(());
            }
            let target = displace(start, *diff)?;
            if entry.offset > target || (inclusive && entry.offset == target && entry.origin == target) {
                *diff = diff.checked_sub(delta).ok_or(Error::Overflow)?;
            }
            Ok(())
        };
        absorb(&mut self.diff.origin, true)?;
        absorb(&mut self.diff.tag, false)?;
        absorb(&mut self.diff.length, false)?;
        Ok(())
    }
}
