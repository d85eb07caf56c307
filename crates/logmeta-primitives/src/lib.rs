//! Byte-level codecs shared by the logmeta key and record formats.
//!
//! Everything here is format-level only: no knowledge of metadata key shapes,
//! column families, or identifier remapping lives in this crate.

mod bytes;
mod number;

pub use bytes::{decode_bytes, encode_bytes, encode_bytes_into, encoded_bytes_len};
pub use number::{
    decode_i64_cmp, decode_u64, decode_u64_desc, decode_uvarint, encode_i64_cmp,
    encode_u64, encode_u64_desc, encode_uvarint,
};

use std::fmt;

///
/// CodecError
///
/// Failure while decoding one byte-level primitive.
/// Callers attach key/record context when crossing their own boundary.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CodecError {
    Truncated { needed: usize, remaining: usize },
    InvalidMarker { marker: u8 },
    NonZeroPadding,
    VarintOverflow,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, remaining } => {
                write!(f, "truncated input: need {needed} bytes, {remaining} remaining")
            }
            Self::InvalidMarker { marker } => write!(f, "invalid group marker 0x{marker:02x}"),
            Self::NonZeroPadding => f.write_str("non-zero group padding"),
            Self::VarintOverflow => f.write_str("varint overflows u64"),
        }
    }
}

impl std::error::Error for CodecError {}
