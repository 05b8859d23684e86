//! Callback-driven decoding of complete messages.

use std::borrow::Cow;

use crate::codec::primitives::Reader;
use crate::codec::value::{decode_value, read_scalar, wire_type_matches};
use crate::error::{Error, Result};
use crate::model::{Descriptor, FieldDescriptor, Value, WireType};

/// Decodes every field of a message, calling `handler` once per value.
///
/// Packed runs are expanded into one call per element. Submessages are passed
/// as [`Value::Bytes`] holding their encoded contents. Unknown tags are
/// skipped.
pub fn decode<'a, F>(data: &'a [u8], descriptor: &'static Descriptor, mut handler: F) -> Result<()>
where
    F: FnMut(&'static FieldDescriptor, Value<'a>) -> Result<()>,
{
    let mut reader = Reader::new(data);
    while !reader.is_empty() {
        let (tag, wire_type) = reader.read_tag()?;
        let Some(field) = descriptor.field_by_tag(tag) else {
            reader.skip(wire_type)?;
            continue;
        };
        if !wire_type_matches(field, wire_type) {
            return Err(Error::UnsupportedWireType {
                wiretype: wire_type as u8,
            });
        }
        if wire_type != WireType::Length {
            handler(field, read_scalar(&mut reader, field.field_type)?)?;
            continue;
        }
        let payload = reader.read_length_delimited()?;
        if field.is_message() {
            handler(field, Value::Bytes(Cow::Borrowed(payload)))?;
        } else if field.field_type.is_packable() {
            let mut run = Reader::new(payload);
            while !run.is_empty() {
                handler(field, read_scalar(&mut run, field.field_type)?)?;
            }
        } else {
            handler(field, decode_value(field.field_type, payload)?)?;
        }
    }
    Ok(())
}
