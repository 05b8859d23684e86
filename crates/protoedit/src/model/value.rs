//! Field types, labels, wiretypes and typed values.

use std::borrow::Cow;

/// Wire encoding kind embedded in the low 3 bits of every tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    Length = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Creates a WireType from the low 3 bits of a tag.
    ///
    /// Groups (3 and 4) are not supported and yield `None`.
    pub fn from_u8(v: u8) -> Option<WireType> {
        match v {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::Length),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }
}

/// Scalar and composite field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    Int32 = 1,
    Int64 = 2,
    Uint32 = 3,
    Uint64 = 4,
    Sint32 = 5,
    Sint64 = 6,
    Fixed32 = 7,
    Fixed64 = 8,
    Sfixed32 = 9,
    Sfixed64 = 10,
    Bool = 11,
    Enum = 12,
    Float = 13,
    Double = 14,
    String = 15,
    Bytes = 16,
    Message = 17,
}

impl FieldType {
    /// Returns the wiretype used to encode a single value of this type.
    pub const fn wire_type(self) -> WireType {
        match self {
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Uint32
            | FieldType::Uint64
            | FieldType::Sint32
            | FieldType::Sint64
            | FieldType::Bool
            | FieldType::Enum => WireType::Varint,
            FieldType::Fixed64 | FieldType::Sfixed64 | FieldType::Double => WireType::Fixed64,
            FieldType::Fixed32 | FieldType::Sfixed32 | FieldType::Float => WireType::Fixed32,
            FieldType::String | FieldType::Bytes | FieldType::Message => WireType::Length,
        }
    }

    /// Returns true if values of this type can appear in a packed field.
    pub const fn is_packable(self) -> bool {
        !matches!(self.wire_type(), WireType::Length)
    }

    /// Returns the zero value of a scalar type, or `None` for messages.
    pub fn zero_value(self) -> Option<Value<'static>> {
        let value = match self {
            FieldType::Int32 => Value::Int32(0),
            FieldType::Int64 => Value::Int64(0),
            FieldType::Uint32 => Value::Uint32(0),
            FieldType::Uint64 => Value::Uint64(0),
            FieldType::Sint32 => Value::Sint32(0),
            FieldType::Sint64 => Value::Sint64(0),
            FieldType::Fixed32 => Value::Fixed32(0),
            FieldType::Fixed64 => Value::Fixed64(0),
            FieldType::Sfixed32 => Value::Sfixed32(0),
            FieldType::Sfixed64 => Value::Sfixed64(0),
            FieldType::Bool => Value::Bool(false),
            FieldType::Enum => Value::Enum(0),
            FieldType::Float => Value::Float(0.0),
            FieldType::Double => Value::Double(0.0),
            FieldType::String => Value::String(Cow::Borrowed("")),
            FieldType::Bytes => Value::Bytes(Cow::Borrowed(&[])),
            FieldType::Message => return None,
        };
        Some(value)
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Required,
    Optional,
    Repeated,
    /// Member of a oneof group.
    Oneof,
}

/// A typed scalar value read from or written to a field.
///
/// Each variant corresponds to exactly one [`FieldType`]; values are checked
/// against the field descriptor before they are encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    /// Zig-zag encoded 32-bit integer.
    Sint32(i32),
    /// Zig-zag encoded 64-bit integer.
    Sint64(i64),
    Fixed32(u32),
    Fixed64(u64),
    Sfixed32(i32),
    Sfixed64(i64),
    Bool(bool),
    /// Enum value number.
    Enum(i32),
    Float(f32),
    Double(f64),
    /// UTF-8 text, no terminator.
    String(Cow<'a, str>),
    /// Opaque byte array.
    Bytes(Cow<'a, [u8]>),
}

impl Value<'_> {
    /// Returns the field type this value encodes as.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Int32(_) => FieldType::Int32,
            Value::Int64(_) => FieldType::Int64,
            Value::Uint32(_) => FieldType::Uint32,
            Value::Uint64(_) => FieldType::Uint64,
            Value::Sint32(_) => FieldType::Sint32,
            Value::Sint64(_) => FieldType::Sint64,
            Value::Fixed32(_) => FieldType::Fixed32,
            Value::Fixed64(_) => FieldType::Fixed64,
            Value::Sfixed32(_) => FieldType::Sfixed32,
            Value::Sfixed64(_) => FieldType::Sfixed64,
            Value::Bool(_) => FieldType::Bool,
            Value::Enum(_) => FieldType::Enum,
            Value::Float(_) => FieldType::Float,
            Value::Double(_) => FieldType::Double,
            Value::String(_) => FieldType::String,
            Value::Bytes(_) => FieldType::Bytes,
        }
    }

    /// Converts a borrowed value into an owned one.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Int32(v) => Value::Int32(v),
            Value::Int64(v) => Value::Int64(v),
            Value::Uint32(v) => Value::Uint32(v),
            Value::Uint64(v) => Value::Uint64(v),
            Value::Sint32(v) => Value::Sint32(v),
            Value::Sint64(v) => Value::Sint64(v),
            Value::Fixed32(v) => Value::Fixed32(v),
            Value::Fixed64(v) => Value::Fixed64(v),
            Value::Sfixed32(v) => Value::Sfixed32(v),
            Value::Sfixed64(v) => Value::Sfixed64(v),
            Value::Bool(v) => Value::Bool(v),
            Value::Enum(v) => Value::Enum(v),
            Value::Float(v) => Value::Float(v),
            Value::Double(v) => Value::Double(v),
            Value::String(v) => Value::String(Cow::Owned(v.into_owned())),
            Value::Bytes(v) => Value::Bytes(Cow::Owned(v.into_owned())),
        }
    }
}
