//! Wire-format and recursion limits.

/// Maximum encoded width of a 32-bit varint.
pub const MAX_VARINT32_BYTES: usize = 5;

/// Maximum encoded width of a 64-bit varint.
pub const MAX_VARINT64_BYTES: usize = 10;

/// Largest field number representable in a tag (29 bits).
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Largest value a length prefix may carry.
pub const MAX_LENGTH: usize = u32::MAX as usize;

/// Default nesting limit for recursive message checks.
pub const MAX_DEPTH: usize = 64;
