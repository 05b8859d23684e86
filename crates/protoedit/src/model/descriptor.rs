//! Immutable schema descriptors.
//!
//! Descriptor tables are produced ahead of time (usually by a code generator)
//! and live in `static`s. Fields are stored sorted ascending by tag, which the
//! lookups below rely on; sorting is the producer's job.
//!
//! ```rust
//! use protoedit::model::{Descriptor, FieldDescriptor, FieldType, Label};
//!
//! static FIELDS: [FieldDescriptor; 2] = [
//!     FieldDescriptor::new(1, "id", FieldType::Uint64, Label::Required),
//!     FieldDescriptor::new(2, "name", FieldType::String, Label::Optional),
//! ];
//! static PERSON: Descriptor = Descriptor::new(&FIELDS);
//!
//! assert_eq!(PERSON.field_by_tag(2).map(|f| f.name), Some("name"));
//! assert!(PERSON.field_by_tag(3).is_none());
//! ```

use std::fmt;
use std::ptr;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::model::value::{FieldType, Label, Value, WireType};

/// Metadata of a single field.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Field number.
    pub tag: u32,
    /// Field name as declared in the schema.
    pub name: &'static str,
    pub field_type: FieldType,
    pub label: Label,
    /// Nested message type, for [`FieldType::Message`].
    pub message: Option<&'static Descriptor>,
    /// Enum type, for [`FieldType::Enum`].
    pub enumeration: Option<&'static EnumDescriptor>,
    /// Owning oneof group, for [`Label::Oneof`].
    pub oneof: Option<&'static OneofDescriptor>,
    /// Declared default value.
    pub default: Option<&'static Value<'static>>,
    /// Repeated scalars encoded as one length-delimited run.
    pub packed: bool,
}

impl FieldDescriptor {
    /// Creates a field descriptor without references, default or packing.
    pub const fn new(tag: u32, name: &'static str, field_type: FieldType, label: Label) -> Self {
        Self {
            tag,
            name,
            field_type,
            label,
            message: None,
            enumeration: None,
            oneof: None,
            default: None,
            packed: false,
        }
    }

    /// Sets the nested message descriptor.
    pub const fn with_message(self, message: &'static Descriptor) -> Self {
        Self {
            message: Some(message),
            ..self
        }
    }

    /// Sets the enum descriptor.
    pub const fn with_enum(self, enumeration: &'static EnumDescriptor) -> Self {
        Self {
            enumeration: Some(enumeration),
            ..self
        }
    }

    /// Sets the owning oneof group.
    pub const fn with_oneof(self, oneof: &'static OneofDescriptor) -> Self {
        Self {
            oneof: Some(oneof),
            ..self
        }
    }

    /// Sets the default value.
    pub const fn with_default(self, default: &'static Value<'static>) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// Marks a repeated scalar field as packed.
    pub const fn with_packed(self) -> Self {
        Self {
            packed: true,
            ..self
        }
    }

    /// Returns the wiretype of a single (unpacked) occurrence.
    pub const fn wire_type(&self) -> WireType {
        self.field_type.wire_type()
    }

    pub const fn is_repeated(&self) -> bool {
        matches!(self.label, Label::Repeated)
    }

    pub const fn is_message(&self) -> bool {
        matches!(self.field_type, FieldType::Message)
    }
}

/// A message descriptor: tag-sorted fields plus an optional extension chain.
pub struct Descriptor {
    fields: &'static [FieldDescriptor],
    extension: OnceLock<&'static Descriptor>,
}

impl Descriptor {
    /// Creates a descriptor over fields sorted ascending by tag.
    pub const fn new(fields: &'static [FieldDescriptor]) -> Self {
        Self {
            fields,
            extension: OnceLock::new(),
        }
    }

    /// Returns the fields declared locally, excluding extensions.
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        self.fields
    }

    /// Returns the number of locally declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the next descriptor in the extension chain.
    pub fn extension(&self) -> Option<&'static Descriptor> {
        self.extension.get().copied()
    }

    /// Iterates over all fields, local ones first, then each extension in
    /// registration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static FieldDescriptor> + '_ {
        let mut chain = Some(self.fields);
        let mut next = self.extension();
        std::iter::from_fn(move || {
            let fields = chain.take()?;
            chain = next.map(|d| d.fields);
            next = next.and_then(Descriptor::extension);
            Some(fields.iter())
        })
        .flatten()
    }

    /// Looks up a field by tag, following the extension chain.
    ///
    /// Tags are strictly ascending and start at 1, so the field with tag `t`
    /// can only sit at an index below `t`: the scan starts there and walks
    /// backwards until it passes the target.
    pub fn field_by_tag(&self, tag: u32) -> Option<&'static FieldDescriptor> {
        let hint = (tag as usize).min(self.fields.len());
        for field in self.fields[..hint].iter().rev() {
            if field.tag == tag {
                return Some(field);
            }
            if field.tag < tag {
                break;
            }
        }
        self.extension()?.field_by_tag(tag)
    }

    /// Looks up a field by name with a linear scan over the whole chain.
    pub fn field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.iter().find(|field| field.name == name)
    }

    /// Appends `extension` at the tail of the extension chain.
    ///
    /// Registering a descriptor that is already part of the chain (or whose
    /// own chain reaches back into this one) is refused.
    pub fn extend(&'static self, extension: &'static Descriptor) -> Result<()> {
        let mut ext = Some(extension);
        while let Some(candidate) = ext {
            if self.chain().any(|node| ptr::eq(node, candidate)) {
                return Err(Error::Invalid {
                    context: "extension already registered",
                });
            }
            ext = candidate.extension();
        }
        let tail = self.chain().last().unwrap_or(self);
        tail.extension.set(extension).map_err(|_| Error::Invalid {
            context: "extension chain modified concurrently",
        })
    }

    fn chain(&'static self) -> impl Iterator<Item = &'static Descriptor> {
        std::iter::successors(Some(self), |d| d.extension())
    }
}

impl fmt::Debug for Descriptor {
    // Shallow on purpose: schemas may be recursive.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("fields", &self.fields.iter().map(|fd| (fd.tag, fd.name)).collect::<Vec<_>>())
            .field("extended", &self.extension.get().is_some())
            .finish()
    }
}

/// A single enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    pub number: i32,
    pub name: &'static str,
}

impl EnumValueDescriptor {
    pub const fn new(number: i32, name: &'static str) -> Self {
        Self { number, name }
    }
}

/// An enum descriptor: values sorted ascending by number.
#[derive(Debug, Clone, Copy)]
pub struct EnumDescriptor {
    values: &'static [EnumValueDescriptor],
}

impl EnumDescriptor {
    pub const fn new(values: &'static [EnumValueDescriptor]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &'static [EnumValueDescriptor] {
        self.values
    }

    /// Looks up a value by number, scanning backwards from the position the
    /// number would occupy in a gap-free table.
    pub fn value_by_number(&self, number: i32) -> Option<&'static EnumValueDescriptor> {
        let first = self.values.first()?.number;
        let distance = i64::from(number) - i64::from(first) + 1;
        let hint = usize::try_from(distance.max(0))
            .unwrap_or(usize::MAX)
            .min(self.values.len());
        for value in self.values[..hint].iter().rev() {
            if value.number == number {
                return Some(value);
            }
            if value.number < number {
                break;
            }
        }
        None
    }

    /// Looks up a value by name with a linear scan.
    pub fn value_by_name(&self, name: &str) -> Option<&'static EnumValueDescriptor> {
        self.values.iter().find(|value| value.name == name)
    }
}

/// A oneof group: indices into the owning descriptor's local fields.
pub struct OneofDescriptor {
    descriptor: &'static Descriptor,
    indices: &'static [usize],
}

impl OneofDescriptor {
    pub const fn new(descriptor: &'static Descriptor, indices: &'static [usize]) -> Self {
        Self {
            descriptor,
            indices,
        }
    }

    /// Returns the descriptor owning this group.
    pub fn descriptor(&self) -> &'static Descriptor {
        self.descriptor
    }

    /// Iterates over the member fields.
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> + '_ {
        let fields = self.descriptor.fields();
        self.indices.iter().filter_map(move |&i| fields.get(i))
    }

    /// Returns true if `tag` names a member of this group.
    pub fn contains(&self, tag: u32) -> bool {
        self.fields().any(|field| field.tag == tag)
    }
}

impl fmt::Debug for OneofDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneofDescriptor")
            .field("tags", &self.fields().map(|fd| fd.tag).collect::<Vec<_>>())
            .finish()
    }
}
