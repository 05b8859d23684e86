//! Shared schemas for integration tests, with prost mirrors used as an
//! independent reference decoder.

#![allow(dead_code)]

use protoedit::{Descriptor, FieldDescriptor, FieldType, Label, OneofDescriptor};

// =============================================================================
// SCALARS
// =============================================================================

pub static SCALAR_FIELDS: [FieldDescriptor; 16] = [
    FieldDescriptor::new(1, "int32", FieldType::Int32, Label::Optional),
    FieldDescriptor::new(2, "int64", FieldType::Int64, Label::Optional),
    FieldDescriptor::new(3, "uint32", FieldType::Uint32, Label::Optional),
    FieldDescriptor::new(4, "uint64", FieldType::Uint64, Label::Optional),
    FieldDescriptor::new(5, "sint32", FieldType::Sint32, Label::Optional),
    FieldDescriptor::new(6, "sint64", FieldType::Sint64, Label::Optional),
    FieldDescriptor::new(7, "fixed32", FieldType::Fixed32, Label::Optional),
    FieldDescriptor::new(8, "fixed64", FieldType::Fixed64, Label::Optional),
    FieldDescriptor::new(9, "sfixed32", FieldType::Sfixed32, Label::Optional),
    FieldDescriptor::new(10, "sfixed64", FieldType::Sfixed64, Label::Optional),
    FieldDescriptor::new(11, "bool", FieldType::Bool, Label::Optional),
    FieldDescriptor::new(12, "enum", FieldType::Enum, Label::Optional),
    FieldDescriptor::new(13, "float", FieldType::Float, Label::Optional),
    FieldDescriptor::new(14, "double", FieldType::Double, Label::Optional),
    FieldDescriptor::new(15, "string", FieldType::String, Label::Optional),
    FieldDescriptor::new(16, "bytes", FieldType::Bytes, Label::Optional),
];
pub static SCALARS: Descriptor = Descriptor::new(&SCALAR_FIELDS);

#[derive(Clone, PartialEq, prost::Message)]
pub struct ScalarsProto {
    #[prost(int32, optional, tag = "1")]
    pub int32: Option<i32>,
    #[prost(int64, optional, tag = "2")]
    pub int64: Option<i64>,
    #[prost(uint32, optional, tag = "3")]
    pub uint32: Option<u32>,
    #[prost(uint64, optional, tag = "4")]
    pub uint64: Option<u64>,
    #[prost(sint32, optional, tag = "5")]
    pub sint32: Option<i32>,
    #[prost(sint64, optional, tag = "6")]
    pub sint64: Option<i64>,
    #[prost(fixed32, optional, tag = "7")]
    pub fixed32: Option<u32>,
    #[prost(fixed64, optional, tag = "8")]
    pub fixed64: Option<u64>,
    #[prost(sfixed32, optional, tag = "9")]
    pub sfixed32: Option<i32>,
    #[prost(sfixed64, optional, tag = "10")]
    pub sfixed64: Option<i64>,
    #[prost(bool, optional, tag = "11")]
    pub bool: Option<bool>,
    #[prost(int32, optional, tag = "12")]
    pub enumeration: Option<i32>,
    #[prost(float, optional, tag = "13")]
    pub float: Option<f32>,
    #[prost(double, optional, tag = "14")]
    pub double: Option<f64>,
    #[prost(string, optional, tag = "15")]
    pub string: Option<String>,
    #[prost(bytes = "vec", optional, tag = "16")]
    pub bytes: Option<Vec<u8>>,
}

// =============================================================================
// DOCUMENT
// =============================================================================

pub static SECTION_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new(1, "title", FieldType::String, Label::Optional),
    FieldDescriptor::new(2, "count", FieldType::Uint64, Label::Optional),
];
pub static SECTION: Descriptor = Descriptor::new(&SECTION_FIELDS);

pub static ITEM_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::new(1, "text", FieldType::String, Label::Oneof).with_oneof(&ITEM_VALUE),
    FieldDescriptor::new(2, "number", FieldType::Uint64, Label::Oneof).with_oneof(&ITEM_VALUE),
    FieldDescriptor::new(3, "label", FieldType::String, Label::Optional),
];
pub static ITEM: Descriptor = Descriptor::new(&ITEM_FIELDS);
pub static ITEM_VALUE: OneofDescriptor = OneofDescriptor::new(&ITEM, &[0, 1]);

pub static DOC_FIELDS: [FieldDescriptor; 7] = [
    FieldDescriptor::new(1, "a", FieldType::String, Label::Optional),
    FieldDescriptor::new(2, "b", FieldType::String, Label::Optional),
    FieldDescriptor::new(3, "c", FieldType::String, Label::Optional),
    FieldDescriptor::new(4, "d", FieldType::String, Label::Optional),
    FieldDescriptor::new(5, "section", FieldType::Message, Label::Optional).with_message(&SECTION),
    FieldDescriptor::new(6, "blobs", FieldType::Bytes, Label::Repeated),
    FieldDescriptor::new(7, "items", FieldType::Message, Label::Repeated).with_message(&ITEM),
];
pub static DOC: Descriptor = Descriptor::new(&DOC_FIELDS);

#[derive(Clone, PartialEq, prost::Message)]
pub struct SectionProto {
    #[prost(string, optional, tag = "1")]
    pub title: Option<String>,
    #[prost(uint64, optional, tag = "2")]
    pub count: Option<u64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ItemProto {
    #[prost(oneof = "item::Value", tags = "1, 2")]
    pub value: Option<item::Value>,
    #[prost(string, optional, tag = "3")]
    pub label: Option<String>,
}

pub mod item {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "1")]
        Text(String),
        #[prost(uint64, tag = "2")]
        Number(u64),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DocProto {
    #[prost(string, optional, tag = "1")]
    pub a: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub b: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub c: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub d: Option<String>,
    #[prost(message, optional, tag = "5")]
    pub section: Option<SectionProto>,
    #[prost(bytes = "vec", repeated, tag = "6")]
    pub blobs: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "7")]
    pub items: Vec<ItemProto>,
}

impl DocProto {
    /// Returns the string field with the given tag.
    pub fn text(&self, tag: u32) -> Option<&str> {
        match tag {
            1 => self.a.as_deref(),
            2 => self.b.as_deref(),
            3 => self.c.as_deref(),
            4 => self.d.as_deref(),
            _ => None,
        }
    }
}
