//! Views into a journal.
//!
//! Every view borrows the journal it reads from and realigns itself with the
//! journal's log before use, so any number of views may be held at once while
//! edits go through any one of them.
//!
//! - [`Part`]: a versioned byte range, the base of all other views
//! - [`Cursor`]: sequential scan over a message's fields
//! - [`Field`]: a typed scalar occurrence
//! - [`Message`]: a part interpreted through a descriptor
//! - [`Oneof`]: a group of mutually exclusive fields

pub mod cursor;
pub mod field;
pub mod message;
pub mod oneof;
pub mod part;

pub use cursor::Cursor;
pub use field::Field;
pub use message::Message;
pub use oneof::Oneof;
pub use part::Part;
