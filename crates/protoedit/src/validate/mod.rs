//! Structural validation of stored messages.
//!
//! Reading a field only inspects the bytes on the path to it. This module
//! walks a whole message tree and checks what reads take for granted:
//! - Non-repeated fields occur at most once
//! - Wiretypes agree with the declared field types
//! - Scalar payloads decode (UTF-8 in strings, varint widths)
//! - Required fields are present
//!
//! Unknown tags are skipped unless strict checking is requested.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::codec::value::{decode_packed, wire_type_matches};
use crate::error::{Error, Result};
use crate::limits::MAX_DEPTH;
use crate::model::Label;
use crate::view::Message;

/// Options for checking messages.
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    /// Reject tags the descriptor does not know.
    pub strict: bool,
    /// Maximum submessage nesting depth.
    pub max_depth: usize,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: MAX_DEPTH,
        }
    }
}

impl CheckOptions {
    /// Creates lenient options: unknown tags are skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates strict options: unknown tags are rejected.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }
}

/// Checks `message` and every submessage below it.
pub fn check(message: &Message<'_, '_>, options: &CheckOptions) -> Result<()> {
    check_at(message, options, 0)
}

fn check_at(message: &Message<'_, '_>, options: &CheckOptions, depth: usize) -> Result<()> {
    if depth > options.max_depth {
        return Err(Error::Invalid {
            context: "message nesting too deep",
        });
    }
    let mut seen = FxHashSet::default();
    let mut cursor = message.cursor(0);
    while cursor.error().is_none() {
        let tag = cursor.tag();
        let Some(field) = cursor.field_descriptor() else {
            if options.strict {
                return Err(Error::UnknownTag { tag });
            }
            debug!(tag, "skipping unknown field");
            cursor.next();
            continue;
        };
        if !wire_type_matches(field, cursor.wire_type()) {
            return Err(Error::UnsupportedWireType {
                wiretype: cursor.wire_type() as u8,
            });
        }
        if !seen.insert(tag) && !field.is_repeated() {
            return Err(Error::Duplicate { tag });
        }
        if field.is_message() {
            check_at(&Message::from_cursor(&cursor)?, options, depth + 1)?;
        } else if cursor.wire_type() == field.wire_type() {
            cursor.get()?;
        } else {
            decode_packed(field.field_type, &cursor.part()?.bytes()?)?;
        }
        cursor.next();
    }
    if let Some(err) = cursor.error().filter(|err| *err != Error::Eom) {
        return Err(err);
    }

    for field in message.descriptor().iter() {
        if field.label == Label::Required && !seen.contains(&field.tag) {
            return Err(Error::MissingRequired { tag: field.tag });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::Journal;
    use crate::model::{Descriptor, FieldDescriptor, FieldType};

    static NODE_FIELDS: [FieldDescriptor; 3] = [
        FieldDescriptor::new(1, "id", FieldType::Uint32, Label::Required),
        FieldDescriptor::new(2, "name", FieldType::String, Label::Optional),
        FieldDescriptor::new(3, "child", FieldType::Message, Label::Repeated).with_message(&NODE),
    ];
    static NODE: Descriptor = Descriptor::new(&NODE_FIELDS);

    fn check_bytes(data: &[u8], options: &CheckOptions) -> Result<()> {
        let journal = Journal::new(data).unwrap();
        Message::new(&journal, &NODE).check(options)
    }

    #[test]
    fn test_valid_tree() {
        // id = 1, child { id = 2 }, child { id = 3, name = "x" }
        let data = b"\x08\x01\x1a\x02\x08\x02\x1a\x05\x08\x03\x12\x01x";
        assert_eq!(check_bytes(data, &CheckOptions::new()), Ok(()));
    }

    #[test]
    fn test_duplicate_field() {
        let data = b"\x08\x01\x12\x00\x12\x00";
        assert_eq!(check_bytes(data, &CheckOptions::new()), Err(Error::Duplicate { tag: 2 }));
    }

    #[test]
    fn test_missing_required_in_child() {
        let data = b"\x08\x01\x1a\x02\x12\x00";
        assert_eq!(
            check_bytes(data, &CheckOptions::new()),
            Err(Error::MissingRequired { tag: 1 })
        );
    }

    #[test]
    fn test_unknown_tag_lenient_and_strict() {
        let data = b"\x08\x01\x78\x05";
        assert_eq!(check_bytes(data, &CheckOptions::new()), Ok(()));
        assert_eq!(
            check_bytes(data, &CheckOptions::strict()),
            Err(Error::UnknownTag { tag: 15 })
        );
    }

    #[test]
    fn test_wiretype_mismatch() {
        let data = b"\x0d\x01\x00\x00\x00";
        assert_eq!(
            check_bytes(data, &CheckOptions::new()),
            Err(Error::UnsupportedWireType { wiretype: 5 })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let data = b"\x08\x01\x12\x01\xff";
        assert!(check_bytes(data, &CheckOptions::new()).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let data = b"\x08\x01\x1a\x04\x08\x02\x1a\x00";
        let options = CheckOptions::new().with_max_depth(1);
        assert!(check_bytes(data, &options).is_err());
        assert_eq!(check_bytes(data, &CheckOptions::new()), Err(Error::MissingRequired { tag: 1 }));
    }
}
