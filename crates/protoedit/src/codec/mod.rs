//! Protocol Buffers wire format.
//!
//! This module implements the binary encoding: primitives (varints, zigzag,
//! fixed-width words, tags), value payloads, and a journal-free encoder and
//! decoder for whole messages.

pub mod decoder;
pub mod encoder;
pub mod primitives;
pub mod value;

pub use decoder::decode;
pub use encoder::Encoder;
pub use primitives::{Reader, Writer, zigzag_decode32, zigzag_decode64, zigzag_encode32, zigzag_encode64};
pub use value::{decode_packed, decode_value, encode_payload, encode_value};
