//! Schema and value types.
//!
//! This module contains the types used to interpret encoded bytes:
//! - Descriptors (messages, fields, enums, oneofs)
//! - Field types, labels and wiretypes
//! - Values (typed scalar instances)

pub mod descriptor;
pub mod value;

pub use descriptor::{
    Descriptor, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, OneofDescriptor,
};
pub use value::{FieldType, Label, Value, WireType};
