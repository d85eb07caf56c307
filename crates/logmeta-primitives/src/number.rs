//! Fixed-width and variable-width integer codecs.

use crate::CodecError;

const SIGN_MASK: u64 = 0x8000_0000_0000_0000;
const U64_BYTES: usize = 8;

/// Append `value` as 8 big-endian bytes.
pub fn encode_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Append `value` so that larger values sort first.
pub fn encode_u64_desc(out: &mut Vec<u8>, value: u64) {
    encode_u64(out, !value);
}

/// Append `value` in sign-flipped big-endian form so signed order is byte order.
#[expect(clippy::cast_sign_loss)]
pub fn encode_i64_cmp(out: &mut Vec<u8>, value: i64) {
    encode_u64(out, (value as u64) ^ SIGN_MASK);
}

/// Append `value` as an unsigned LEB128 varint.
#[expect(clippy::cast_possible_truncation)]
pub fn encode_uvarint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Decode 8 big-endian bytes from the front of `input`.
pub fn decode_u64(input: &[u8]) -> Result<(u64, &[u8]), CodecError> {
    if input.len() < U64_BYTES {
        return Err(CodecError::Truncated {
            needed: U64_BYTES,
            remaining: input.len(),
        });
    }

    let (head, rest) = input.split_at(U64_BYTES);
    let mut buf = [0u8; U64_BYTES];
    buf.copy_from_slice(head);

    Ok((u64::from_be_bytes(buf), rest))
}

/// Decode a value written by [`encode_u64_desc`].
pub fn decode_u64_desc(input: &[u8]) -> Result<(u64, &[u8]), CodecError> {
    decode_u64(input).map(|(value, rest)| (!value, rest))
}

/// Decode a value written by [`encode_i64_cmp`].
#[expect(clippy::cast_possible_wrap)]
pub fn decode_i64_cmp(input: &[u8]) -> Result<(i64, &[u8]), CodecError> {
    decode_u64(input).map(|(value, rest)| ((value ^ SIGN_MASK) as i64, rest))
}

/// Decode an unsigned LEB128 varint from the front of `input`.
pub fn decode_uvarint(input: &[u8]) -> Result<(u64, &[u8]), CodecError> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for (idx, byte) in input.iter().enumerate() {
        if shift == 63 && *byte > 1 {
            return Err(CodecError::VarintOverflow);
        }

        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, &input[idx + 1..]));
        }

        shift += 7;
    }

    Err(CodecError::Truncated {
        needed: input.len() + 1,
        remaining: input.len(),
    })
}

///
/// TESTS
///
