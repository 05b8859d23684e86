//! Error types for in-place reading and editing.

use thiserror::Error;

/// Error codes forming the error taxonomy shared by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Allocator failure (including resize attempts on zero-copy buffers)
    Alloc,
    /// Operation on a structurally invalid or cleared view
    Invalid,
    /// Malformed or overlong varint
    Varint,
    /// Start/end arguments out of range
    Offset,
    /// Required field or default missing
    Absent,
    /// Cursor exhausted the message
    Eom,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "ALLOC").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::Alloc => "ALLOC",
            ErrorCode::Invalid => "INVALID",
            ErrorCode::Varint => "VARINT",
            ErrorCode::Offset => "OFFSET",
            ErrorCode::Absent => "ABSENT",
            ErrorCode::Eom => "EOM",
        }
    }
}

/// Error raised by buffers, journals, views and codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    // === ALLOC ===
    #[error("[ALLOC] allocator refused {size} bytes")]
    Alloc { size: usize },

    #[error("[ALLOC] zero-copy buffer cannot be resized")]
    ZeroCopy,

    // === INVALID ===
    #[error("[INVALID] {context}")]
    Invalid { context: &'static str },

    #[error("[INVALID] unknown tag {tag}")]
    UnknownTag { tag: u32 },

    #[error("[INVALID] value type mismatch for tag {tag}")]
    TypeMismatch { tag: u32 },

    #[error("[INVALID] non-repeated field {tag} occurs more than once")]
    Duplicate { tag: u32 },

    #[error("[INVALID] unsupported wiretype {wiretype}")]
    UnsupportedWireType { wiretype: u8 },

    // === VARINT ===
    #[error("[VARINT] malformed varint while reading {context}")]
    Varint { context: &'static str },

    // === OFFSET ===
    #[error("[OFFSET] range {start}..{end} out of bounds (size: {size})")]
    Offset { start: usize, end: usize, size: usize },

    #[error("[OFFSET] offset arithmetic overflow")]
    Overflow,

    #[error("[OFFSET] {field} length {len} exceeds maximum {max}")]
    LengthExceedsLimit {
        field: &'static str,
        len: usize,
        max: usize,
    },

    // === ABSENT ===
    #[error("[ABSENT] field {tag} is absent and has no default")]
    Absent { tag: u32 },

    #[error("[ABSENT] required field {tag} is missing")]
    MissingRequired { tag: u32 },

    // === EOM ===
    #[error("[EOM] end of message")]
    Eom,
}

impl Error {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Alloc { .. } | Error::ZeroCopy => ErrorCode::Alloc,
            Error::Invalid { .. }
            | Error::UnknownTag { .. }
            | Error::TypeMismatch { .. }
            | Error::Duplicate { .. }
            | Error::UnsupportedWireType { .. } => ErrorCode::Invalid,
            Error::Varint { .. } => ErrorCode::Varint,
            Error::Offset { .. } | Error::Overflow | Error::LengthExceedsLimit { .. } => {
                ErrorCode::Offset
            }
            Error::Absent { .. } | Error::MissingRequired { .. } => ErrorCode::Absent,
            Error::Eom => ErrorCode::Eom,
        }
    }

    /// Invalidated-view error, the most common INVALID condition.
    pub(crate) const fn invalidated() -> Self {
        Error::Invalid {
            context: "view was invalidated",
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
