//! Typed scalar fields.

use crate::codec::value::{check_type, decode_packed, decode_value, encode_payload};
use crate::error::{Error, Result};
use crate::model::{FieldDescriptor, Value};
use crate::view::cursor::Cursor;
use crate::view::message::Message;
use crate::view::part::Part;

/// One occurrence of a scalar field.
#[derive(Debug, Clone, Copy)]
pub struct Field<'j, 'a> {
    part: Part<'j, 'a>,
    descriptor: &'static FieldDescriptor,
}

impl<'j, 'a> Field<'j, 'a> {
    /// Finds or creates the field `tag` in `message`.
    ///
    /// A new occurrence holds the field's default, or the zero value of its
    /// type. Repeated fields always get a new occurrence.
    pub fn create(message: &mut Message<'j, 'a>, tag: u32) -> Result<Self> {
        let descriptor = message.field_descriptor(tag)?;
        if descriptor.is_message() {
            return Err(Error::TypeMismatch { tag });
        }
        let owner = message.descriptor();
        let part = Part::create(message.part_mut(), owner, tag)?;
        Ok(Self { part, descriptor })
    }

    /// Creates the submessages named by all but the last tag of `path`, then
    /// the field named by the last one.
    pub fn create_nested(message: &mut Message<'j, 'a>, path: &[u32]) -> Result<Self> {
        let (&tag, parents) = path.split_last().ok_or(Error::Invalid {
            context: "empty field path",
        })?;
        let mut parent = message.create_nested(parents)?;
        Self::create(&mut parent, tag)
    }

    /// Returns the cursor's current occurrence as a field.
    pub fn from_cursor(cursor: &Cursor<'j, 'a>) -> Result<Self> {
        let descriptor = cursor
            .field_descriptor()
            .ok_or(Error::UnknownTag { tag: cursor.tag() })?;
        if descriptor.is_message() {
            return Err(Error::TypeMismatch {
                tag: descriptor.tag,
            });
        }
        Ok(Self {
            part: cursor.part()?,
            descriptor,
        })
    }

    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    pub fn tag(&self) -> u32 {
        self.descriptor.tag
    }

    pub fn part(&self) -> Part<'j, 'a> {
        self.part
    }

    pub fn is_valid(&self) -> bool {
        self.part.is_valid()
    }

    /// Returns true if this occurrence is a packed run of several values.
    fn is_packed_run(&self) -> bool {
        self.part.is_length_delimited() && self.descriptor.field_type.is_packable()
    }

    /// Decodes the value.
    pub fn get(&mut self) -> Result<Value<'static>> {
        if self.is_packed_run() {
            return Err(Error::Invalid {
                context: "packed occurrence holds several values",
            });
        }
        let payload = self.part.bytes()?;
        decode_value(self.descriptor.field_type, &payload).map(Value::into_owned)
    }

    /// Decodes every value held by this occurrence: one, or all elements of a
    /// packed run.
    pub fn values(&mut self) -> Result<Vec<Value<'static>>> {
        if self.is_packed_run() {
            return decode_packed(self.descriptor.field_type, &self.part.bytes()?);
        }
        self.get().map(|value| vec![value])
    }

    /// Replaces the value.
    pub fn put(&mut self, value: &Value<'_>) -> Result<()> {
        check_type(self.descriptor, value)?;
        if self.is_packed_run() {
            return Err(Error::Invalid {
                context: "packed occurrence holds several values",
            });
        }
        self.part.write(&encode_payload(value))
    }

    /// Returns true if the field holds `value`.
    pub fn matches(&mut self, value: &Value<'_>) -> Result<bool> {
        check_type(self.descriptor, value)?;
        Ok(self.get()? == *value)
    }

    /// Removes the occurrence. The field is invalid afterwards.
    pub fn clear(&mut self) -> Result<()> {
        self.part.clear()
    }
}
