//! Append-only message encoding.
//!
//! An [`Encoder`] builds a message front to back without a journal. It is the
//! cheap way to produce a buffer that is later edited in place.

use std::ptr;

use crate::codec::primitives::Writer;
use crate::codec::value::{check_type, encode_value};
use crate::error::{Error, Result};
use crate::model::{Descriptor, FieldDescriptor, Value, WireType};

/// Writer of one message, checked against its descriptor.
#[derive(Debug, Clone)]
pub struct Encoder {
    descriptor: &'static Descriptor,
    writer: Writer,
}

impl Encoder {
    pub fn new(descriptor: &'static Descriptor) -> Self {
        Self {
            descriptor,
            writer: Writer::new(),
        }
    }

    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    fn field(&self, tag: u32) -> Result<&'static FieldDescriptor> {
        self.descriptor
            .field_by_tag(tag)
            .ok_or(Error::UnknownTag { tag })
    }

    /// Appends one scalar occurrence.
    pub fn encode(&mut self, tag: u32, value: &Value<'_>) -> Result<()> {
        let field = self.field(tag)?;
        check_type(field, value)?;
        let wire_type = field.wire_type();
        self.writer.write_tag(tag, wire_type)?;
        match value {
            Value::String(text) => self.writer.write_length_delimited(text.as_bytes()),
            Value::Bytes(bytes) => self.writer.write_length_delimited(bytes),
            _ => {
                encode_value(value, &mut self.writer);
                Ok(())
            }
        }
    }

    /// Appends a repeated scalar field as one packed run.
    pub fn encode_packed(&mut self, tag: u32, values: &[Value<'_>]) -> Result<()> {
        let field = self.field(tag)?;
        if !field.is_repeated() || !field.field_type.is_packable() {
            return Err(Error::TypeMismatch { tag });
        }
        let mut run = Writer::with_capacity(values.len() * 2);
        for value in values {
            check_type(field, value)?;
            encode_value(value, &mut run);
        }
        self.writer.write_tag(tag, WireType::Length)?;
        self.writer.write_length_delimited(run.as_bytes())
    }

    /// Appends a submessage built by another encoder.
    pub fn encode_message(&mut self, tag: u32, message: &Encoder) -> Result<()> {
        let field = self.field(tag)?;
        if !field.message.is_some_and(|d| ptr::eq(d, message.descriptor)) {
            return Err(Error::TypeMismatch { tag });
        }
        self.encode_message_bytes(tag, message.as_bytes())
    }

    /// Appends an already encoded submessage.
    pub fn encode_message_bytes(&mut self, tag: u32, contents: &[u8]) -> Result<()> {
        let field = self.field(tag)?;
        if !field.is_message() {
            return Err(Error::TypeMismatch { tag });
        }
        self.writer.write_tag(tag, WireType::Length)?;
        self.writer.write_length_delimited(contents)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}
