//! Sequential scans over a message's fields.

use crate::codec::primitives::Reader;
use crate::codec::value::{decode_value, wire_type_matches};
use crate::error::{Error, Result};
use crate::journal::offset::distance;
use crate::journal::{Diff, Offset};
use crate::model::{Descriptor, FieldDescriptor, Value, WireType};
use crate::view::part::Part;

/// Iterator over the occurrences of one tag (or of every tag) in a message.
///
/// The cursor keeps a copy of the message part and realigns both the copy and
/// the current occurrence before every step, so it stays usable while the
/// journal is edited through other views. Errors are sticky: once
/// [`Cursor::next`] returned `false`, [`Cursor::error`] tells whether the
/// message was exhausted ([`Error::Eom`]) or malformed.
#[derive(Debug, Clone)]
pub struct Cursor<'j, 'a> {
    message: Part<'j, 'a>,
    descriptor: &'static Descriptor,
    tag: u32,
    current: Offset,
    current_tag: u32,
    wire_type: WireType,
    pos: usize,
    error: Option<Error>,
    /// Result of the scan done by [`Cursor::erase`], consumed by the next step.
    pending: Option<bool>,
}

impl<'j, 'a> Cursor<'j, 'a> {
    /// Creates a cursor over `message` and positions it at the first
    /// occurrence of `tag`. A tag of zero matches every field.
    pub fn new(mut message: Part<'j, 'a>, descriptor: &'static Descriptor, tag: u32) -> Self {
        // Seed the scan from the aligned start of the message
        let aligned = message.align();
        let start = message.start();
        let mut cursor = Self {
            message,
            descriptor,
            tag,
            current: Offset::new(start, start),
            current_tag: 0,
            wire_type: WireType::Varint,
            pos: 0,
            error: aligned.err(),
            pending: None,
        };
        cursor.next();
        cursor
    }

    /// Advances to the next matching occurrence.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }
        match self.step() {
            Ok(true) => true,
            Ok(false) => {
                self.error = Some(Error::Eom);
                false
            }
            Err(err) => {
                self.error = Some(err);
                false
            }
        }
    }

    /// Restarts the scan at the beginning of the message.
    pub fn rewind(&mut self) -> bool {
        self.error = None;
        self.pending = None;
        self.pos = 0;
        if let Err(err) = self.message.align() {
            self.error = Some(err);
            return false;
        }
        let start = self.message.start();
        self.current = Offset::new(start, start);
        self.current_tag = 0;
        self.next()
    }

    /// Advances until an occurrence holds `value`, starting with the current
    /// one.
    pub fn seek(&mut self, value: &Value<'_>) -> bool {
        loop {
            if self.error.is_some() {
                return false;
            }
            match self.matches(value) {
                Ok(true) => return true,
                Ok(false) => {}
                Err(err) => {
                    self.error = Some(err);
                    return false;
                }
            }
            if !self.next() {
                return false;
            }
        }
    }

    /// Returns true if the current occurrence holds `value`.
    pub fn matches(&mut self, value: &Value<'_>) -> Result<bool> {
        let field = self.field()?;
        if value.field_type() != field.field_type {
            return Err(Error::TypeMismatch { tag: field.tag });
        }
        Ok(self.get()? == *value)
    }

    /// Decodes the current occurrence.
    pub fn get(&mut self) -> Result<Value<'static>> {
        let field = self.field()?;
        if field.is_message() {
            return Err(Error::TypeMismatch { tag: field.tag });
        }
        if self.wire_type != field.wire_type() {
            return Err(Error::Invalid {
                context: "packed occurrence holds several values",
            });
        }
        let payload = self.part()?.bytes()?;
        decode_value(field.field_type, &payload).map(Value::into_owned)
    }

    /// Returns the current occurrence as a part.
    pub fn part(&self) -> Result<Part<'j, 'a>> {
        self.occupied()?;
        Ok(Part::from_raw(
            self.message.journal(),
            self.message.version(),
            self.current,
        ))
    }

    /// Removes the current occurrence and looks ahead for the next match,
    /// which the following [`Cursor::next`] returns.
    pub fn erase(&mut self) -> Result<()> {
        self.sync()?;
        self.occupied()?;
        let mut part = self.part()?;
        part.clear()?;
        self.sync()?;

        let resume = self.current.start;
        self.current_tag = 0;
        let found = self.scan(resume)?;
        self.pending = Some(found);
        Ok(())
    }

    /// Returns the tag of the current occurrence, or zero if there is none.
    pub fn tag(&self) -> u32 {
        self.current_tag
    }

    /// Returns the wiretype of the current occurrence.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// Returns the number of occurrences visited since the last rewind.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Returns the descriptor of the message being scanned.
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// Returns the descriptor of the current occurrence, if its tag is known.
    pub fn field_descriptor(&self) -> Option<&'static FieldDescriptor> {
        self.descriptor.field_by_tag(self.current_tag)
    }

    /// Returns the offset of the current occurrence.
    pub fn offset(&self) -> Offset {
        self.current
    }

    /// Returns the message part the cursor scans.
    pub fn message(&self) -> Part<'j, 'a> {
        self.message
    }

    fn occupied(&self) -> Result<()> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.current_tag == 0 || self.pending == Some(false) {
            return Err(Error::Eom);
        }
        Ok(())
    }

    fn field(&mut self) -> Result<&'static FieldDescriptor> {
        self.sync()?;
        self.occupied()?;
        let field = self
            .field_descriptor()
            .ok_or(Error::UnknownTag { tag: self.current_tag })?;
        if !wire_type_matches(field, self.wire_type) {
            return Err(Error::UnsupportedWireType {
                wiretype: self.wire_type as u8,
            });
        }
        Ok(field)
    }

    /// Realigns the message copy and the current occurrence.
    fn sync(&mut self) -> Result<()> {
        let since = self.message.version();
        self.message.align()?;
        if self.message.journal().replay(since, &mut self.current)? {
            // The occurrence is gone; the collapsed offset marks where to resume
            self.current_tag = 0;
            if self.pending == Some(true) {
                self.pending = None;
            }
        }
        Ok(())
    }

    fn step(&mut self) -> Result<bool> {
        self.sync()?;
        if let Some(found) = self.pending.take() {
            if found {
                self.pos += 1;
            }
            return Ok(found);
        }
        let from = if self.current_tag == 0 {
            self.current.start
        } else {
            self.current.end
        };
        let found = self.scan(from)?;
        if found {
            self.pos += 1;
        }
        Ok(found)
    }

    /// Scans forward from `from` for the next matching occurrence.
    fn scan(&mut self, from: usize) -> Result<bool> {
        let start = self.message.start();
        let end = self.message.end();
        let data = self.message.journal().data();
        let window = data.get(..end).ok_or(Error::Offset {
            start,
            end,
            size: data.len(),
        })?;
        let mut reader = Reader::at(window, from.clamp(start, end));
        while !reader.is_empty() {
            let tag_pos = reader.position();
            let (tag, wire_type) = reader.read_tag()?;
            let length_pos = reader.position();
            let value_start = if wire_type == WireType::Length {
                let len = reader.read_varint32("length")? as usize;
                let value_start = reader.position();
                reader.read_bytes(len)?;
                value_start
            } else {
                reader.skip(wire_type)?;
                length_pos
            };
            if self.tag == 0 || self.tag == tag {
                let length = if wire_type == WireType::Length {
                    distance(value_start, length_pos)?
                } else {
                    0
                };
                self.current = Offset {
                    start: value_start,
                    end: reader.position(),
                    diff: Diff {
                        origin: distance(value_start, start)?,
                        tag: distance(value_start, tag_pos)?,
                        length,
                    },
                };
                self.current_tag = tag;
                self.wire_type = wire_type;
                return Ok(true);
            }
        }
        Ok(false)
    }
}
