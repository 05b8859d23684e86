//! Value payload encoding/decoding.
//!
//! A payload is the value part of a field: everything after the tag and,
//! for length-delimited fields, after the length prefix.

use std::borrow::Cow;

use crate::codec::primitives::{Reader, Writer};
use crate::error::{Error, Result};
use crate::model::{FieldDescriptor, FieldType, Value, WireType};

// =============================================================================
// DECODING
// =============================================================================

/// Decodes a complete payload as a value of `field_type` (zero-copy).
///
/// The payload must be consumed entirely.
pub fn decode_value(field_type: FieldType, payload: &[u8]) -> Result<Value<'_>> {
    let mut reader = Reader::new(payload);
    let value = match field_type {
        FieldType::String => {
            let text = std::str::from_utf8(payload).map_err(|_| Error::Invalid {
                context: "invalid UTF-8 in string field",
            })?;
            return Ok(Value::String(Cow::Borrowed(text)));
        }
        FieldType::Bytes => return Ok(Value::Bytes(Cow::Borrowed(payload))),
        FieldType::Message => {
            return Err(Error::Invalid {
                context: "message fields have no scalar value",
            })
        }
        _ => read_scalar(&mut reader, field_type)?,
    };
    if !reader.is_empty() {
        return Err(Error::Invalid {
            context: "trailing bytes after scalar value",
        });
    }
    Ok(value)
}

/// Decodes the elements of a packed run.
pub fn decode_packed(field_type: FieldType, payload: &[u8]) -> Result<Vec<Value<'static>>> {
    if !field_type.is_packable() {
        return Err(Error::Invalid {
            context: "length-delimited types cannot be packed",
        });
    }
    let mut reader = Reader::new(payload);
    let mut values = Vec::new();
    while !reader.is_empty() {
        values.push(read_scalar(&mut reader, field_type)?);
    }
    Ok(values)
}

/// Reads one scalar (non length-delimited) value.
pub(crate) fn read_scalar(reader: &mut Reader<'_>, field_type: FieldType) -> Result<Value<'static>> {
    let value = match field_type {
        FieldType::Int32 => Value::Int32(reader.read_varint64("int32")? as i32),
        FieldType::Int64 => Value::Int64(reader.read_varint64("int64")? as i64),
        FieldType::Uint32 => Value::Uint32(reader.read_varint32("uint32")?),
        FieldType::Uint64 => Value::Uint64(reader.read_varint64("uint64")?),
        FieldType::Sint32 => Value::Sint32(reader.read_sint32("sint32")?),
        FieldType::Sint64 => Value::Sint64(reader.read_sint64("sint64")?),
        FieldType::Bool => Value::Bool(reader.read_varint64("bool")? != 0),
        FieldType::Enum => Value::Enum(reader.read_varint64("enum")? as i32),
        FieldType::Fixed32 => Value::Fixed32(reader.read_fixed32()?),
        FieldType::Fixed64 => Value::Fixed64(reader.read_fixed64()?),
        FieldType::Sfixed32 => Value::Sfixed32(reader.read_fixed32()? as i32),
        FieldType::Sfixed64 => Value::Sfixed64(reader.read_fixed64()? as i64),
        FieldType::Float => Value::Float(f32::from_bits(reader.read_fixed32()?)),
        FieldType::Double => Value::Double(f64::from_bits(reader.read_fixed64()?)),
        FieldType::String | FieldType::Bytes | FieldType::Message => {
            return Err(Error::Invalid {
                context: "length-delimited type read as scalar",
            })
        }
    };
    Ok(value)
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes the payload of a value (no tag, no length prefix).
pub fn encode_value(value: &Value<'_>, writer: &mut Writer) {
    match value {
        // Negative int32/enum values are sign-extended to ten bytes
        Value::Int32(v) | Value::Enum(v) => writer.write_varint(i64::from(*v) as u64),
        Value::Int64(v) => writer.write_varint(*v as u64),
        Value::Uint32(v) => writer.write_varint(u64::from(*v)),
        Value::Uint64(v) => writer.write_varint(*v),
        Value::Sint32(v) => writer.write_sint32(*v),
        Value::Sint64(v) => writer.write_sint64(*v),
        Value::Bool(v) => writer.write_varint(u64::from(*v)),
        Value::Fixed32(v) => writer.write_fixed32(*v),
        Value::Fixed64(v) => writer.write_fixed64(*v),
        Value::Sfixed32(v) => writer.write_fixed32(*v as u32),
        Value::Sfixed64(v) => writer.write_fixed64(*v as u64),
        Value::Float(v) => writer.write_fixed32(v.to_bits()),
        Value::Double(v) => writer.write_fixed64(v.to_bits()),
        Value::String(v) => writer.write_bytes(v.as_bytes()),
        Value::Bytes(v) => writer.write_bytes(v),
    }
}

/// Encodes the payload of a value into a fresh vector.
pub fn encode_payload(value: &Value<'_>) -> Vec<u8> {
    let mut writer = Writer::with_capacity(16);
    encode_value(value, &mut writer);
    writer.into_bytes()
}

/// Checks that `value` may be stored in the field described by `field`.
pub fn check_type(field: &FieldDescriptor, value: &Value<'_>) -> Result<()> {
    if value.field_type() != field.field_type {
        return Err(Error::TypeMismatch { tag: field.tag });
    }
    Ok(())
}

/// Returns true if an occurrence with `wire_type` is a valid encoding of `field`.
pub fn wire_type_matches(field: &FieldDescriptor, wire_type: WireType) -> bool {
    wire_type == field.wire_type()
        || (field.is_repeated() && field.field_type.is_packable() && wire_type == WireType::Length)
}
