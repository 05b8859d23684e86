//! Versioned byte ranges.
//!
//! A [`Part`] is the one concrete occurrence of a field or submessage inside a
//! journal. It remembers the journal version its [`Offset`] was computed at
//! and realigns itself before every use.

use tracing::{debug, trace};

use crate::codec::primitives::{Reader, Writer, encode_varint};
use crate::codec::value::encode_payload;
use crate::error::{Error, Result};
use crate::journal::offset::{displace, distance};
use crate::journal::{Diff, INVALID_VERSION, Journal, Offset};
use crate::limits::{MAX_LENGTH, MAX_VARINT64_BYTES};
use crate::model::{Descriptor, WireType};
use crate::view::cursor::Cursor;

/// A versioned window into a journal.
#[derive(Debug, Clone, Copy)]
pub struct Part<'j, 'a> {
    journal: &'j Journal<'a>,
    version: usize,
    offset: Offset,
}

impl<'j, 'a> Part<'j, 'a> {
    /// Creates a part spanning the whole buffer, without tag or length prefix.
    pub fn root(journal: &'j Journal<'a>) -> Self {
        Self {
            journal,
            version: journal.version(),
            offset: Offset::new(0, journal.len()),
        }
    }

    pub(crate) fn from_raw(journal: &'j Journal<'a>, version: usize, offset: Offset) -> Self {
        Self {
            journal,
            version,
            offset,
        }
    }

    /// Finds or creates the occurrence of `tag` inside `message`.
    ///
    /// An existing occurrence of a non-repeated field is returned as is.
    /// Otherwise a new occurrence is inserted after the last field whose tag
    /// does not exceed `tag`, holding the field's default or zero value, and
    /// every enclosing length prefix is grown to match.
    pub fn create(
        message: &mut Part<'j, 'a>,
        descriptor: &'static Descriptor,
        tag: u32,
    ) -> Result<Self> {
        message.align()?;
        let field = descriptor
            .field_by_tag(tag)
            .ok_or(Error::UnknownTag { tag })?;

        let mut insert = message.start();
        let mut cursor = Cursor::new(*message, descriptor, 0);
        while cursor.error().is_none() {
            if cursor.tag() == tag && !field.is_repeated() {
                return cursor.part();
            }
            if cursor.tag() <= tag {
                insert = cursor.offset().end;
            }
            cursor.next();
        }
        if let Some(err) = cursor.error().filter(|err| *err != Error::Eom) {
            return Err(err);
        }

        let payload = field
            .default
            .cloned()
            .or_else(|| field.field_type.zero_value())
            .map(|value| encode_payload(&value))
            .unwrap_or_default();
        let wire_type = field.wire_type();
        let mut header = Writer::with_capacity(payload.len() + 8);
        header.write_tag(tag, wire_type)?;
        let tag_len = header.len();
        if wire_type == WireType::Length {
            header.write_length_delimited(&payload)?;
        } else {
            header.write_bytes(&payload);
        }
        let head_len = header.len() - payload.len();
        let bytes = header.into_bytes();

        let journal = message.journal;
        let origin = message.start();
        journal.write(origin, insert, insert, &bytes)?;

        let start = insert + head_len;
        let length = if wire_type == WireType::Length {
            distance(start, insert + tag_len)?
        } else {
            0
        };
        let mut part = Self {
            journal,
            version: journal.version(),
            offset: Offset {
                start,
                end: start + payload.len(),
                diff: Diff {
                    origin: distance(start, origin)?,
                    tag: distance(start, insert)?,
                    length,
                },
            },
        };
        debug!(tag, start, end = part.offset.end, "part created");

        let grown = distance(0, bytes.len())?;
        if let Err(err) = adjust(journal, origin, grown).and_then(|()| part.align()) {
            part.invalidate();
            return Err(err);
        }
        Ok(part)
    }

    pub fn journal(&self) -> &'j Journal<'a> {
        self.journal
    }

    /// Returns the journal version the offset is valid at.
    pub fn version(&self) -> usize {
        self.version
    }

    /// Returns the offset as of [`Part::version`].
    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn start(&self) -> usize {
        self.offset.start
    }

    pub fn end(&self) -> usize {
        self.offset.end
    }

    pub fn size(&self) -> usize {
        self.offset.size()
    }

    pub fn is_valid(&self) -> bool {
        self.version != INVALID_VERSION
    }

    /// Returns true if no entries were logged since the last alignment.
    pub fn is_aligned(&self) -> bool {
        self.version == self.journal.version()
    }

    /// Returns true if the value is preceded by a length prefix.
    pub fn is_length_delimited(&self) -> bool {
        self.offset.diff.length != 0
    }

    /// Catches up with the journal.
    pub fn align(&mut self) -> Result<()> {
        let result = self.journal.align(&mut self.version, &mut self.offset);
        if result.is_err() {
            self.version = INVALID_VERSION;
        }
        result
    }

    pub fn invalidate(&mut self) {
        if self.is_valid() {
            debug!(start = self.offset.start, end = self.offset.end, "part invalidated");
        }
        self.version = INVALID_VERSION;
    }

    /// Returns a copy of the value bytes.
    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        self.align()?;
        let data = self.journal.data();
        data.get(self.offset.start..self.offset.end)
            .map(<[u8]>::to_vec)
            .ok_or(Error::Offset {
                start: self.offset.start,
                end: self.offset.end,
                size: data.len(),
            })
    }

    /// Replaces the value bytes with `data`.
    ///
    /// The own length prefix and those of all enclosing messages are updated.
    /// If the buffer refuses to grow nothing changes; a failure after the
    /// bytes were written invalidates the part.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.align()?;
        let Offset { start, end, .. } = self.offset;
        let delta = distance(end - start, data.len())?;
        if delta == 0 {
            return self.journal.write(start, start, end, data);
        }
        if self.is_length_delimited() && data.len() > MAX_LENGTH {
            return Err(Error::LengthExceedsLimit {
                field: "value",
                len: data.len(),
                max: MAX_LENGTH,
            });
        }
        let parent = self.offset.origin()?;
        self.journal.write(start, start, end, data)?;

        let result = self.propagate(parent, delta);
        if result.is_err() {
            self.invalidate();
        }
        result
    }

    fn propagate(&mut self, parent: usize, delta: isize) -> Result<()> {
        self.align()?;
        let grown = delta
            .checked_add(self.adjust_prefix()?)
            .ok_or(Error::Overflow)?;
        adjust(self.journal, parent, grown)?;
        self.align()
    }

    /// Removes the whole occurrence, header included. The part is invalid
    /// afterwards.
    pub fn clear(&mut self) -> Result<()> {
        self.align()?;
        let tag = self.offset.tag()?;
        let end = self.offset.end;
        let parent = self.offset.origin()?;
        if tag < end {
            self.journal.clear(tag, tag, end)?;
            debug!(tag_pos = tag, end, "part cleared");
            let result = adjust(self.journal, parent, distance(end, tag)?);
            self.invalidate();
            return result;
        }
        self.invalidate();
        Ok(())
    }

    /// Re-encodes the own length prefix, returning its change in width.
    fn adjust_prefix(&mut self) -> Result<isize> {
        let Some(pos) = self.offset.length()? else {
            return Ok(0);
        };
        let width = self.offset.start - pos;
        let len = self.offset.size();
        let mut prefix = [0u8; MAX_VARINT64_BYTES];
        let n = encode_varint(len as u64, &mut prefix);
        self.journal.write(pos, pos, self.offset.start, &prefix[..n])?;
        trace!(pos, len, width, new_width = n, "length prefix rewritten");
        self.align()?;
        distance(width, n)
    }
}

/// A length prefix on the path from the buffer root to a message.
#[derive(Debug, Clone, Copy)]
struct Prefix {
    pos: usize,
    width: usize,
    len: usize,
}

/// Grows the length prefix of the message whose value starts at `start` by
/// `delta`, then every prefix enclosing it.
///
/// Prefixes are rewritten innermost first so that recorded positions of the
/// outer ones stay valid. A change in varint width adds to the delta seen by
/// the next level.
pub(crate) fn adjust(journal: &Journal<'_>, start: usize, delta: isize) -> Result<()> {
    if start == 0 || delta == 0 {
        return Ok(());
    }
    let chain = enclosing(journal, start)?;
    let mut delta = delta;
    for prefix in chain.iter().rev() {
        let len = displace(prefix.len, delta)?;
        if len > MAX_LENGTH {
            return Err(Error::LengthExceedsLimit {
                field: "message",
                len,
                max: MAX_LENGTH,
            });
        }
        let mut buf = [0u8; MAX_VARINT64_BYTES];
        let n = encode_varint(len as u64, &mut buf);
        journal.write(prefix.pos, prefix.pos, prefix.pos + prefix.width, &buf[..n])?;
        trace!(pos = prefix.pos, len, width = prefix.width, new_width = n, "length prefix rewritten");
        delta = delta
            .checked_add(distance(prefix.width, n)?)
            .ok_or(Error::Overflow)?;
    }
    Ok(())
}

/// Collects the length prefixes from the root down to the message whose
/// value starts at `target`.
///
/// Lengths are read as stored. They may be stale below the edit that is being
/// propagated, but every byte before `target` is intact.
fn enclosing(journal: &Journal<'_>, target: usize) -> Result<Vec<Prefix>> {
    let data = journal.data();
    let mut reader = Reader::new(&data);
    let mut limit = data.len();
    let mut chain = Vec::new();
    loop {
        if reader.position() >= limit {
            return Err(Error::Invalid {
                context: "enclosing message not found",
            });
        }
        let (_, wire_type) = reader.read_tag()?;
        if wire_type != WireType::Length {
            reader.skip(wire_type)?;
            continue;
        }
        let pos = reader.position();
        let len = reader.read_varint32("length")? as usize;
        let value = reader.position();
        let end = value.checked_add(len).ok_or(Error::Overflow)?;
        let prefix = Prefix {
            pos,
            width: value - pos,
            len,
        };
        if value == target {
            chain.push(prefix);
            return Ok(chain);
        }
        if value < target && target <= end {
            chain.push(prefix);
            limit = end;
            continue;
        }
        reader.read_bytes(len)?;
    }
}
