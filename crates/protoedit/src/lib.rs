//! protoedit: in-place reading and editing of Protocol Buffers messages.
//!
//! Messages are never deserialized into an object tree. Every field, submessage
//! or iterator is a *view* holding a byte range of one shared buffer, and every
//! edit rewrites that buffer in place.
//!
//! # Overview
//!
//! Edits that change the size of a range are recorded in a [`Journal`], an
//! append-only log of `{origin, offset, delta}` entries. A view remembers the
//! journal version its offsets were computed at; before it is used again it
//! replays the entries logged since, which shifts, resizes or invalidates it.
//! Length prefixes of all enclosing messages are kept up to date on every
//! write.
//!
//! # Quick Start
//!
//! ```rust
//! use protoedit::{Descriptor, Field, FieldDescriptor, FieldType, Journal, Label, Message, Value};
//!
//! static FIELDS: [FieldDescriptor; 2] = [
//!     FieldDescriptor::new(1, "name", FieldType::String, Label::Optional),
//!     FieldDescriptor::new(2, "id", FieldType::Uint32, Label::Optional),
//! ];
//! static PERSON: Descriptor = Descriptor::new(&FIELDS);
//!
//! // id = 7
//! let journal = Journal::new(b"\x10\x07").unwrap();
//! let mut person = Message::new(&journal, &PERSON);
//! let mut id = Field::from_cursor(&person.cursor(2)).unwrap();
//!
//! // Inserting a field in front of `id` moves its bytes
//! person.put(1, &Value::String("Ada".into())).unwrap();
//! assert_eq!(id.get().unwrap(), Value::Uint32(7));
//!
//! id.put(&Value::Uint32(300)).unwrap();
//! assert_eq!(journal.to_vec(), b"\x0a\x03Ada\x10\xac\x02");
//! ```
//!
//! # Modules
//!
//! - [`journal`]: Buffers, allocators, the entry log and offset alignment
//! - [`view`]: Part, Cursor, Field, Message and Oneof views
//! - [`model`]: Descriptors and values
//! - [`codec`]: Wire format primitives, lite encoder and decoder
//! - [`validate`]: Whole-tree checks of stored messages
//! - [`error`]: Error types
//! - [`limits`]: Wire format limits
//!
//! # Threading
//!
//! A journal is used from one thread at a time. Views borrow it through a
//! shared reference and the journal mutates through interior mutability, so it
//! is `!Sync` and the compiler rejects sharing it across threads.

pub mod codec;
pub mod error;
pub mod journal;
pub mod limits;
pub mod model;
pub mod validate;
pub mod view;

// Re-export commonly used types at crate root
pub use codec::{Encoder, decode};
pub use error::{Error, ErrorCode, Result};
pub use journal::{
    Allocator, BoundedAllocator, Buffer, Entry, Journal, NullAllocator, Offset, SystemAllocator,
};
pub use model::{
    Descriptor, EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FieldType, Label,
    OneofDescriptor, Value, WireType,
};
pub use validate::{CheckOptions, check};
pub use view::{Cursor, Field, Message, Oneof, Part};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
