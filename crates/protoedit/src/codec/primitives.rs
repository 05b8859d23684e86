//! Primitive encoding/decoding for the Protocol Buffers wire format.
//!
//! Implements varint, signed varint (zigzag), fixed-width and tag primitives.

use crate::error::{Error, Result};
use crate::limits::{MAX_TAG, MAX_VARINT32_BYTES, MAX_VARINT64_BYTES};
use crate::model::WireType;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding wire data.
///
/// Wraps a byte slice and provides methods for reading primitives
/// with bounds checking and error handling.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Creates a reader positioned at `pos`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the remaining bytes.
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or(&[])
    }

    /// Returns the number of remaining bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads exactly n bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(Error::Overflow)?;
        let bytes = self.data.get(self.pos..end).ok_or(Error::Offset {
            start: self.pos,
            end,
            size: self.data.len(),
        })?;
        self.pos = end;
        Ok(bytes)
    }

    /// Reads an unsigned varint of at most 10 groups.
    #[inline]
    pub fn read_varint64(&mut self, context: &'static str) -> Result<u64> {
        let mut result: u64 = 0;
        let mut shift = 0;

        for _ in 0..MAX_VARINT64_BYTES {
            let byte = *self.data.get(self.pos).ok_or(Error::Varint { context })?;
            self.pos += 1;
            let value = u64::from(byte & 0x7F);

            // The tenth group may only carry the top bit
            if shift == 63 && value > 1 {
                return Err(Error::Varint { context });
            }
            result |= value << shift;

            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }

        Err(Error::Varint { context })
    }

    /// Reads an unsigned varint of at most 5 groups.
    ///
    /// Bits above 32 in the fifth group are discarded.
    #[inline]
    pub fn read_varint32(&mut self, context: &'static str) -> Result<u32> {
        let mut result: u64 = 0;

        for i in 0..MAX_VARINT32_BYTES {
            let byte = *self.data.get(self.pos).ok_or(Error::Varint { context })?;
            self.pos += 1;
            result |= u64::from(byte & 0x7F) << (7 * i);

            if byte & 0x80 == 0 {
                return Ok(result as u32);
            }
        }

        Err(Error::Varint { context })
    }

    /// Reads a zigzag-encoded 32-bit varint.
    pub fn read_sint32(&mut self, context: &'static str) -> Result<i32> {
        Ok(zigzag_decode32(self.read_varint32(context)?))
    }

    /// Reads a zigzag-encoded 64-bit varint.
    pub fn read_sint64(&mut self, context: &'static str) -> Result<i64> {
        Ok(zigzag_decode64(self.read_varint64(context)?))
    }

    /// Reads a little-endian 32-bit word.
    #[inline]
    pub fn read_fixed32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(word))
    }

    /// Reads a little-endian 64-bit word.
    #[inline]
    pub fn read_fixed64(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(word))
    }

    /// Reads a tag, returning the field number and wiretype.
    pub fn read_tag(&mut self) -> Result<(u32, WireType)> {
        let key = self.read_varint32("tag")?;
        let wiretype = (key & 0x07) as u8;
        let wire_type =
            WireType::from_u8(wiretype).ok_or(Error::UnsupportedWireType { wiretype })?;
        let tag = key >> 3;
        if tag == 0 {
            return Err(Error::Invalid {
                context: "field number zero",
            });
        }
        Ok((tag, wire_type))
    }

    /// Reads a length prefix and returns the delimited bytes.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint32("length")? as usize;
        self.read_bytes(len)
    }

    /// Skips the payload of a field with the given wiretype.
    pub fn skip(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => self.read_varint64("varint").map(|_| ()),
            WireType::Fixed64 => self.read_bytes(8).map(|_| ()),
            WireType::Length => self.read_length_delimited().map(|_| ()),
            WireType::Fixed32 => self.read_bytes(4).map(|_| ()),
        }
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes an unsigned varint into a stack buffer, returning the used length.
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut [u8; MAX_VARINT64_BYTES]) -> usize {
    let mut len = 0;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf[len] = byte;
        len += 1;
        if value == 0 {
            return len;
        }
    }
}

/// Returns the number of bytes the varint encoding of `value` occupies.
#[inline]
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Builds the key of a tag: `field_number << 3 | wiretype`.
pub fn tag_key(tag: u32, wire_type: WireType) -> Result<u32> {
    if tag == 0 || tag > MAX_TAG {
        return Err(Error::UnknownTag { tag });
    }
    Ok(tag << 3 | wire_type as u32)
}

/// Writer for encoding wire data.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes an unsigned varint (LEB128).
    #[inline]
    pub fn write_varint(&mut self, value: u64) {
        let mut buf = [0u8; MAX_VARINT64_BYTES];
        let len = encode_varint(value, &mut buf);
        self.buf.extend_from_slice(&buf[..len]);
    }

    /// Writes a zigzag-encoded 32-bit varint.
    pub fn write_sint32(&mut self, value: i32) {
        self.write_varint(u64::from(zigzag_encode32(value)));
    }

    /// Writes a zigzag-encoded 64-bit varint.
    pub fn write_sint64(&mut self, value: i64) {
        self.write_varint(zigzag_encode64(value));
    }

    /// Writes a little-endian 32-bit word.
    pub fn write_fixed32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a little-endian 64-bit word.
    pub fn write_fixed64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a tag.
    pub fn write_tag(&mut self, tag: u32, wire_type: WireType) -> Result<()> {
        self.write_varint(u64::from(tag_key(tag, wire_type)?));
        Ok(())
    }

    /// Writes a length-prefixed byte array.
    pub fn write_length_delimited(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len()).map_err(|_| Error::LengthExceedsLimit {
            field: "length-delimited",
            len: bytes.len(),
            max: u32::MAX as usize,
        })?;
        self.write_varint(u64::from(len));
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

// =============================================================================
// ZIGZAG ENCODING
// =============================================================================

/// Encodes a signed 32-bit integer using zigzag encoding.
///
/// Maps negative numbers to odd positive numbers:
/// 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
#[inline]
pub fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Decodes a zigzag-encoded 32-bit integer back to signed.
#[inline]
pub fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ (-((n & 1) as i32))
}

/// Encodes a signed 64-bit integer using zigzag encoding.
#[inline]
pub fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Decodes a zigzag-encoded 64-bit integer back to signed.
#[inline]
pub fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zigzag_values() {
        assert_eq!(zigzag_encode32(0), 0);
        assert_eq!(zigzag_encode32(-1), 1);
        assert_eq!(zigzag_encode32(1), 2);
        assert_eq!(zigzag_encode32(-2), 3);
        assert_eq!(zigzag_encode64(i64::MIN), u64::MAX);
        assert_eq!(zigzag_decode32(u32::MAX), i32::MIN);
    }

    #[test]
    fn test_zigzag_sign_roundtrip() {
        for v in [0i32, 1, -1, 63, -64, i32::MAX, i32::MIN] {
            assert_eq!(zigzag_decode32(zigzag_encode32(v)), v);
        }
        for v in [0i64, -1, -129, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode64(zigzag_encode64(v)), v);
        }
    }

    #[test]
    fn test_varint32_billion_is_five_bytes() {
        let mut buf = [0u8; MAX_VARINT64_BYTES];
        let len = encode_varint(1_000_000_000, &mut buf);
        assert_eq!(len, 5);
        for byte in &buf[..4] {
            assert_ne!(byte & 0x80, 0);
        }
        assert_eq!(buf[4] & 0x80, 0);

        let mut reader = Reader::new(&buf[..len]);
        assert_eq!(reader.read_varint32("test").unwrap(), 1_000_000_000);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_varint_len() {
        for v in [0u64, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX] {
            let mut buf = [0u8; MAX_VARINT64_BYTES];
            assert_eq!(varint_len(v), encode_varint(v, &mut buf), "value {v}");
        }
    }

    #[test]
    fn test_varint32_overflows_past_five_groups() {
        let data = [0x80u8, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut reader = Reader::new(&data);
        assert!(matches!(reader.read_varint32("test"), Err(Error::Varint { .. })));
    }

    #[test]
    fn test_varint64_too_long() {
        let data = [0x80u8; 11];
        let mut reader = Reader::new(&data);
        assert!(matches!(reader.read_varint64("test"), Err(Error::Varint { .. })));

        let mut data = [0xFFu8; 10];
        data[9] = 0x02;
        let mut reader = Reader::new(&data);
        assert!(matches!(reader.read_varint64("test"), Err(Error::Varint { .. })));
    }

    #[test]
    fn test_truncated_varint() {
        let mut reader = Reader::new(&[0x80]);
        assert!(matches!(reader.read_varint64("test"), Err(Error::Varint { .. })));
    }

    #[test]
    fn test_tag_roundtrip_and_groups_rejected() {
        let mut writer = Writer::new();
        writer.write_tag(150, WireType::Length).unwrap();
        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(reader.read_tag().unwrap(), (150, WireType::Length));

        // Field 1, wiretype 3 (start group)
        let mut reader = Reader::new(&[0x0B]);
        assert!(matches!(
            reader.read_tag(),
            Err(Error::UnsupportedWireType { wiretype: 3 })
        ));
        assert!(Writer::new().write_tag(0, WireType::Varint).is_err());
    }

    #[test]
    fn test_skip_and_bounds() {
        let mut writer = Writer::new();
        writer.write_length_delimited(b"abc").unwrap();
        writer.write_fixed32(7);
        let mut reader = Reader::new(writer.as_bytes());
        reader.skip(WireType::Length).unwrap();
        assert_eq!(reader.read_fixed32().unwrap(), 7);
        assert!(matches!(reader.read_fixed64(), Err(Error::Offset { .. })));
    }
}
