//! Growable byte buffers, owned or borrowed.

use tracing::warn;

use crate::error::{Error, Result};
use crate::journal::allocator::{Allocator, SYSTEM};

#[derive(Debug)]
enum Storage<'a> {
    Owned(Vec<u8>),
    /// Caller-owned memory; may be rewritten in place but never resized.
    Borrowed(&'a mut [u8]),
}

/// A byte buffer whose ranges can be replaced by data of a different size.
#[derive(Debug)]
pub struct Buffer<'a> {
    storage: Storage<'a>,
    allocator: &'a dyn Allocator,
}

impl Buffer<'static> {
    /// Creates a buffer holding a copy of `data`.
    pub fn new(data: &[u8]) -> Result<Self> {
        Buffer::with_allocator(data, &SYSTEM)
    }

    /// Creates an empty buffer.
    pub fn empty() -> Self {
        Buffer::empty_with_allocator(&SYSTEM)
    }
}

impl<'a> Buffer<'a> {
    /// Creates a buffer holding a copy of `data`, allocated through `allocator`.
    pub fn with_allocator(data: &[u8], allocator: &'a dyn Allocator) -> Result<Self> {
        let mut store = allocator.allocate(data.len()).ok_or_else(|| {
            warn!(size = data.len(), "allocator refused buffer copy");
            Error::Alloc { size: data.len() }
        })?;
        store.extend_from_slice(data);
        Ok(Self {
            storage: Storage::Owned(store),
            allocator,
        })
    }

    /// Creates an empty buffer that grows through `allocator`.
    pub fn empty_with_allocator(allocator: &'a dyn Allocator) -> Self {
        Self {
            storage: Storage::Owned(Vec::new()),
            allocator,
        }
    }

    /// Wraps caller-owned memory without copying.
    ///
    /// Same-size writes go straight to `data`; any write that would change
    /// the size fails.
    pub fn zero_copy(data: &'a mut [u8]) -> Self {
        Self {
            storage: Storage::Borrowed(data),
            allocator: &SYSTEM,
        }
    }

    /// Returns the buffer contents.
    pub fn data(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(data) => data,
            Storage::Borrowed(data) => data,
        }
    }

    /// Returns the logical size in bytes.
    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_zero_copy(&self) -> bool {
        matches!(self.storage, Storage::Borrowed(_))
    }

    /// Consumes the buffer, returning its contents.
    pub fn into_vec(self) -> Vec<u8> {
        match self.storage {
            Storage::Owned(data) => data,
            Storage::Borrowed(data) => data.to_vec(),
        }
    }

    /// Replaces `[start, end)` with `data`.
    ///
    /// A failed grow leaves the buffer unchanged. A failed shrink of the
    /// backing store is tolerated; size and contents are still exact.
    pub fn write(&mut self, start: usize, end: usize, data: &[u8]) -> Result<()> {
        let len = self.len();
        if start > end || end > len {
            return Err(Error::Offset {
                start,
                end,
                size: len,
            });
        }
        let removed = end - start;
        match &mut self.storage {
            Storage::Borrowed(store) => {
                if data.len() != removed {
                    return Err(Error::ZeroCopy);
                }
                store[start..end].copy_from_slice(data);
            }
            Storage::Owned(store) => {
                let size = len - removed + data.len();
                if size == 0 {
                    self.allocator.free(std::mem::take(store));
                    return Ok(());
                }
                if size > store.capacity() {
                    let granted = if store.capacity() == 0 {
                        self.allocator.allocate(size).map(|fresh| *store = fresh).is_some()
                    } else {
                        self.allocator.resize(store, size)
                    };
                    if !granted {
                        warn!(size, "allocator refused buffer growth");
                        return Err(Error::Alloc { size });
                    }
                }
                store.splice(start..end, data.iter().copied());
                if size < len {
                    // Excess capacity is not an error
                    self.allocator.resize(store, size);
                }
            }
        }
        Ok(())
    }

    /// Removes `[start, end)`.
    pub fn clear(&mut self, start: usize, end: usize) -> Result<()> {
        self.write(start, end, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::allocator::{BoundedAllocator, NullAllocator};

    #[test]
    fn test_write_grow_and_shrink() {
        let mut buffer = Buffer::new(b"hello world").unwrap();
        buffer.write(0, 5, b"goodbye").unwrap();
        assert_eq!(buffer.data(), b"goodbye world");
        buffer.write(7, 13, b"!").unwrap();
        assert_eq!(buffer.data(), b"goodbye!");
        buffer.write(8, 8, b"?").unwrap();
        assert_eq!(buffer.data(), b"goodbye!?");
    }

    #[test]
    fn test_clear_to_empty_frees() {
        let mut buffer = Buffer::new(b"abc").unwrap();
        buffer.clear(0, 3).unwrap();
        assert!(buffer.is_empty());
        buffer.write(0, 0, b"x").unwrap();
        assert_eq!(buffer.data(), b"x");
    }

    #[test]
    fn test_out_of_range() {
        let mut buffer = Buffer::new(b"abc").unwrap();
        assert!(matches!(buffer.write(2, 4, b""), Err(Error::Offset { .. })));
        assert!(matches!(buffer.write(2, 1, b""), Err(Error::Offset { .. })));
    }

    #[test]
    fn test_null_allocator() {
        assert!(matches!(
            Buffer::with_allocator(b"abc", &NullAllocator),
            Err(Error::Alloc { size: 3 })
        ));
        let mut buffer = Buffer::empty_with_allocator(&NullAllocator);
        assert!(matches!(buffer.write(0, 0, b"a"), Err(Error::Alloc { .. })));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_failed_grow_leaves_buffer_unchanged() {
        let alloc = BoundedAllocator::new(4);
        let mut buffer = Buffer::with_allocator(b"abcd", &alloc).unwrap();
        assert!(matches!(buffer.write(1, 2, b"xyz"), Err(Error::Alloc { size: 6 })));
        assert_eq!(buffer.data(), b"abcd");

        // Shrinking works even though the allocator is saturated
        buffer.write(1, 3, b"").unwrap();
        assert_eq!(buffer.data(), b"ad");
    }

    #[test]
    fn test_zero_copy_refuses_resize() {
        let mut raw = *b"abcd";
        {
            let mut buffer = Buffer::zero_copy(&mut raw);
            assert!(buffer.is_zero_copy());
            assert!(matches!(buffer.write(0, 1, b"xy"), Err(Error::ZeroCopy)));
            assert!(matches!(buffer.clear(0, 1), Err(Error::ZeroCopy)));
            buffer.write(1, 3, b"XY").unwrap();
        }
        assert_eq!(&raw, b"aXYd");
    }
}
