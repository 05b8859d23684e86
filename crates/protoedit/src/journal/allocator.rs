//! Pluggable allocators backing owned buffers.
//!
//! An allocator decides whether a buffer's backing store may grow. Every
//! method reports failure instead of aborting, so a refusing allocator makes
//! buffer operations fail cleanly with an ALLOC error.

use std::fmt;

/// Allocation capability installed per buffer.
pub trait Allocator: fmt::Debug {
    /// Returns an empty store able to hold at least `size` bytes.
    fn allocate(&self, size: usize) -> Option<Vec<u8>>;

    /// Adjusts the capacity of `data` to `size` bytes.
    ///
    /// Growing must not change the contents of `data` and returns `false` if
    /// the capacity could not be provided. Shrinking may be ignored.
    fn resize(&self, data: &mut Vec<u8>, size: usize) -> bool;

    /// Releases a store.
    fn free(&self, data: Vec<u8>) {
        drop(data);
    }
}

/// The process allocator, with fallible reservations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

/// Shared instance used when no allocator is given.
pub static SYSTEM: SystemAllocator = SystemAllocator;

impl Allocator for SystemAllocator {
    fn allocate(&self, size: usize) -> Option<Vec<u8>> {
        let mut data = Vec::new();
        data.try_reserve_exact(size).ok()?;
        Some(data)
    }

    fn resize(&self, data: &mut Vec<u8>, size: usize) -> bool {
        if size > data.len() {
            data.try_reserve_exact(size - data.len()).is_ok()
        } else {
            data.shrink_to(size);
            true
        }
    }
}

/// An allocator that refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAllocator;

impl Allocator for NullAllocator {
    fn allocate(&self, _size: usize) -> Option<Vec<u8>> {
        None
    }

    fn resize(&self, _data: &mut Vec<u8>, _size: usize) -> bool {
        false
    }
}

/// An allocator that caps each store at a fixed number of bytes.
#[derive(Debug, Clone, Copy)]
pub struct BoundedAllocator {
    limit: usize,
}

impl BoundedAllocator {
    /// Creates an allocator refusing stores larger than `limit` bytes.
    pub const fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Allocator for BoundedAllocator {
    fn allocate(&self, size: usize) -> Option<Vec<u8>> {
        if size > self.limit {
            return None;
        }
        SYSTEM.allocate(size)
    }

    fn resize(&self, data: &mut Vec<u8>, size: usize) -> bool {
        if size > self.limit {
            return false;
        }
        SYSTEM.resize(data, size)
    }
}
