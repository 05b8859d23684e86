//! Oneof groups.

use std::ptr;

use crate::error::{Error, Result};
use crate::model::OneofDescriptor;
use crate::view::cursor::Cursor;
use crate::view::message::Message;

/// A oneof group of a message, scanned with a tagless cursor.
#[derive(Debug, Clone)]
pub struct Oneof<'j, 'a> {
    descriptor: &'static OneofDescriptor,
    cursor: Cursor<'j, 'a>,
}

impl<'j, 'a> Oneof<'j, 'a> {
    pub fn new(message: &Message<'j, 'a>, descriptor: &'static OneofDescriptor) -> Result<Self> {
        if !ptr::eq(descriptor.descriptor(), message.descriptor()) {
            return Err(Error::Invalid {
                context: "oneof belongs to another message",
            });
        }
        Ok(Self {
            descriptor,
            cursor: message.cursor(0),
        })
    }

    pub fn descriptor(&self) -> &'static OneofDescriptor {
        self.descriptor
    }

    /// Returns the tag of the member seen last, or zero if no member is
    /// present.
    pub fn case(&mut self) -> Result<u32> {
        let mut case = 0;
        self.cursor.rewind();
        while self.cursor.error().is_none() {
            if self.descriptor.contains(self.cursor.tag()) {
                case = self.cursor.tag();
            }
            self.cursor.next();
        }
        self.finish().map(|()| case)
    }

    /// Removes every member occurrence, in encounter order.
    pub fn clear(&mut self) -> Result<()> {
        self.cursor.rewind();
        while self.cursor.error().is_none() {
            if self.descriptor.contains(self.cursor.tag()) {
                self.cursor.erase()?;
            }
            self.cursor.next();
        }
        self.finish()
    }

    fn finish(&self) -> Result<()> {
        match self.cursor.error() {
            Some(Error::Eom) | None => Ok(()),
            Some(err) => Err(err),
        }
    }
}
