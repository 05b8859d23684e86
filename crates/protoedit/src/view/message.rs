//! Messages: a part interpreted through a descriptor.

use std::ptr;

use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::model::{Descriptor, FieldDescriptor, Value};
use crate::validate::{CheckOptions, check};
use crate::view::cursor::Cursor;
use crate::view::field::Field;
use crate::view::oneof::Oneof;
use crate::view::part::Part;

/// A message stored in a journal.
///
/// Reads go through a cursor positioned at the requested tag and never touch
/// the buffer; writes create the field or submessage on demand.
#[derive(Debug, Clone, Copy)]
pub struct Message<'j, 'a> {
    part: Part<'j, 'a>,
    descriptor: &'static Descriptor,
}

impl<'j, 'a> Message<'j, 'a> {
    /// Creates the root message spanning the whole journal.
    pub fn new(journal: &'j Journal<'a>, descriptor: &'static Descriptor) -> Self {
        Self {
            part: Part::root(journal),
            descriptor,
        }
    }

    /// Returns the cursor's current occurrence as a submessage.
    pub fn from_cursor(cursor: &Cursor<'j, 'a>) -> Result<Self> {
        let field = cursor
            .field_descriptor()
            .ok_or(Error::UnknownTag { tag: cursor.tag() })?;
        let descriptor = submessage(field)?;
        Ok(Self {
            part: cursor.part()?,
            descriptor,
        })
    }

    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    pub fn part(&self) -> Part<'j, 'a> {
        self.part
    }

    pub(crate) fn part_mut(&mut self) -> &mut Part<'j, 'a> {
        &mut self.part
    }

    pub fn journal(&self) -> &'j Journal<'a> {
        self.part.journal()
    }

    pub fn is_valid(&self) -> bool {
        self.part.is_valid()
    }

    /// Looks up a field of this message, extensions included.
    pub fn field_descriptor(&self, tag: u32) -> Result<&'static FieldDescriptor> {
        self.descriptor
            .field_by_tag(tag)
            .ok_or(Error::UnknownTag { tag })
    }

    /// Returns a cursor over the occurrences of `tag`, or over every field if
    /// `tag` is zero.
    pub fn cursor(&self, tag: u32) -> Cursor<'j, 'a> {
        Cursor::new(self.part, self.descriptor, tag)
    }

    /// Returns the value of the first occurrence of `tag`.
    ///
    /// An absent field yields its declared default, or [`Error::Absent`].
    pub fn get(&self, tag: u32) -> Result<Value<'static>> {
        let field = self.field_descriptor(tag)?;
        if field.is_message() {
            return Err(Error::TypeMismatch { tag });
        }
        let mut cursor = self.cursor(tag);
        match cursor.error() {
            None => cursor.get(),
            Some(Error::Eom) => field.default.cloned().ok_or(Error::Absent { tag }),
            Some(err) => Err(err),
        }
    }

    /// Returns true if `tag` occurs at least once.
    pub fn has(&self, tag: u32) -> Result<bool> {
        self.field_descriptor(tag)?;
        match self.cursor(tag).error() {
            None => Ok(true),
            Some(Error::Eom) => Ok(false),
            Some(err) => Err(err),
        }
    }

    /// Returns true if the first occurrence of `tag` holds `value`. An absent
    /// field matches nothing.
    pub fn matches(&self, tag: u32, value: &Value<'_>) -> Result<bool> {
        let field = self.field_descriptor(tag)?;
        if value.field_type() != field.field_type {
            return Err(Error::TypeMismatch { tag });
        }
        let mut cursor = self.cursor(tag);
        match cursor.error() {
            None => cursor.matches(value),
            Some(Error::Eom) => Ok(false),
            Some(err) => Err(err),
        }
    }

    /// Writes `value` to the field `tag`.
    ///
    /// Repeated fields get a new occurrence. Writing a oneof member first
    /// removes whichever other member of the group is present.
    pub fn put(&mut self, tag: u32, value: &Value<'_>) -> Result<()> {
        let field = self.field_descriptor(tag)?;
        if field.is_message() {
            return Err(Error::TypeMismatch { tag });
        }
        if value.field_type() != field.field_type {
            return Err(Error::TypeMismatch { tag });
        }
        self.release_oneof(field)?;
        Field::create(self, tag)?.put(value)
    }

    /// Copies the contents of `source` into the submessage `tag`.
    ///
    /// The source must live in a different journal.
    pub fn put_message(&mut self, tag: u32, source: &Message<'_, '_>) -> Result<()> {
        if ptr::addr_eq(self.journal(), source.journal()) {
            return Err(Error::Invalid {
                context: "source message shares the destination journal",
            });
        }
        let field = self.field_descriptor(tag)?;
        if !ptr::eq(submessage(field)?, source.descriptor) {
            return Err(Error::TypeMismatch { tag });
        }
        let contents = source.raw()?;
        self.release_oneof(field)?;
        self.create_within(tag)?.part.write(&contents)
    }

    /// Writes an already encoded payload to the field `tag`.
    pub fn put_raw(&mut self, tag: u32, payload: &[u8]) -> Result<()> {
        let field = self.field_descriptor(tag)?;
        self.release_oneof(field)?;
        Part::create(&mut self.part, self.descriptor, tag)?.write(payload)
    }

    /// Finds or creates the submessage `tag`.
    ///
    /// For a oneof member, a different member of the group is removed first.
    pub fn create_within(&mut self, tag: u32) -> Result<Message<'j, 'a>> {
        let field = self.field_descriptor(tag)?;
        let descriptor = submessage(field)?;
        self.release_oneof(field)?;
        let part = Part::create(&mut self.part, self.descriptor, tag)?;
        Ok(Message { part, descriptor })
    }

    /// Finds or creates each submessage along `path`.
    pub fn create_nested(&mut self, path: &[u32]) -> Result<Message<'j, 'a>> {
        let mut message = *self;
        for &tag in path {
            message = message.create_within(tag)?;
        }
        Ok(message)
    }

    /// Removes every occurrence of `tag`. For a oneof member the whole group
    /// is cleared. Erasing an absent field succeeds.
    pub fn erase(&mut self, tag: u32) -> Result<()> {
        let field = self.field_descriptor(tag)?;
        if let Some(oneof) = field.oneof {
            return Oneof::new(self, oneof)?.clear();
        }
        let mut cursor = self.cursor(tag);
        while cursor.error().is_none() {
            cursor.erase()?;
            cursor.next();
        }
        match cursor.error() {
            Some(Error::Eom) | None => Ok(()),
            Some(err) => Err(err),
        }
    }

    /// Removes all fields.
    ///
    /// The root message stays usable and empty. A submessage is removed
    /// together with its header and becomes invalid.
    pub fn clear(&mut self) -> Result<()> {
        if self.part.offset().diff.tag == 0 {
            return self.part.write(&[]);
        }
        self.part.clear()
    }

    /// Returns a copy of the encoded contents.
    pub fn raw(&self) -> Result<Vec<u8>> {
        let mut part = self.part;
        part.bytes()
    }

    /// Validates the message tree.
    pub fn check(&self, options: &CheckOptions) -> Result<()> {
        check(self, options)
    }

    fn release_oneof(&mut self, field: &'static FieldDescriptor) -> Result<()> {
        let Some(oneof) = field.oneof else {
            return Ok(());
        };
        let mut group = Oneof::new(self, oneof)?;
        let case = group.case()?;
        if case != 0 && case != field.tag {
            group.clear()?;
        }
        Ok(())
    }
}

fn submessage(field: &'static FieldDescriptor) -> Result<&'static Descriptor> {
    if !field.is_message() {
        return Err(Error::TypeMismatch { tag: field.tag });
    }
    field.message.ok_or(Error::Invalid {
        context: "message field without descriptor",
    })
}
