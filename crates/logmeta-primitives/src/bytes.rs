//! Memcomparable byte-string encoding.
//!
//! Input is split into 8-byte groups; each group is zero-padded to full width
//! and followed by one marker byte `0xFF - pad`. The encoding preserves the
//! byte order of the original strings and is self-delimiting.

use crate::CodecError;

const GROUP_SIZE: usize = 8;
const MARKER: u8 = 0xFF;
const PAD: u8 = 0x00;

/// Number of bytes `encode_bytes` produces for `len` input bytes.
#[must_use]
pub const fn encoded_bytes_len(len: usize) -> usize {
    (len / GROUP_SIZE + 1) * (GROUP_SIZE + 1)
}

/// Encode `data` as a standalone memcomparable byte string.
#[must_use]
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_bytes_len(data.len()));
    encode_bytes_into(&mut out, data);
    out
}

/// Append the memcomparable encoding of `data` to `out`.
#[expect(clippy::cast_possible_truncation)]
pub fn encode_bytes_into(out: &mut Vec<u8>, data: &[u8]) {
    let mut idx = 0;
    loop {
        let remain = data.len() - idx;
        if remain >= GROUP_SIZE {
            out.extend_from_slice(&data[idx..idx + GROUP_SIZE]);
            out.push(MARKER);
        } else {
            let pad = GROUP_SIZE - remain;
            out.extend_from_slice(&data[idx..]);
            out.extend(std::iter::repeat_n(PAD, pad));
            out.push(MARKER - pad as u8);
            return;
        }
        idx += GROUP_SIZE;
    }
}

/// Decode one memcomparable byte string from the front of `input`.
///
/// Returns the decoded bytes and the unread remainder.
pub fn decode_bytes(input: &[u8]) -> Result<(Vec<u8>, &[u8]), CodecError> {
    let mut out = Vec::with_capacity(input.len());
    let mut rest = input;

    loop {
        if rest.len() < GROUP_SIZE + 1 {
            return Err(CodecError::Truncated {
                needed: GROUP_SIZE + 1,
                remaining: rest.len(),
            });
        }

        let (group, tail) = rest.split_at(GROUP_SIZE + 1);
        rest = tail;

        let marker = group[GROUP_SIZE];
        let pad = usize::from(MARKER - marker);
        if pad > GROUP_SIZE {
            return Err(CodecError::InvalidMarker { marker });
        }

        let real = GROUP_SIZE - pad;
        out.extend_from_slice(&group[..real]);

        if pad != 0 {
            if group[real..GROUP_SIZE].iter().any(|b| *b != PAD) {
                return Err(CodecError::NonZeroPadding);
            }
            return Ok((out, rest));
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input_encodes_to_one_padded_group() {
        assert_eq!(
            encode_bytes(b""),
            vec![0, 0, 0, 0, 0, 0, 0, 0, 0xF7],
        );
    }

    #[test]
    fn full_group_is_followed_by_terminator_group() {
        let encoded = encode_bytes(b"12345678");
        assert_eq!(encoded.len(), 18);
        assert_eq!(encoded[8], 0xFF);
        assert_eq!(encoded[17], 0xF7);
    }

    #[test]
    fn decode_returns_unread_suffix() {
        let mut buf = encode_bytes(b"DB:1");
        buf.extend_from_slice(b"tail");

        let (decoded, rest) = decode_bytes(&buf).expect("encoded bytes should decode");
        assert_eq!(decoded, b"DB:1");
        assert_eq!(rest, b"tail");
    }

    #[test]
    fn decode_rejects_bad_marker_and_padding() {
        let mut bad_marker = encode_bytes(b"abc");
        bad_marker[8] = 0x10;
        assert_eq!(
            decode_bytes(&bad_marker).expect_err("marker below range must fail"),
            CodecError::InvalidMarker { marker: 0x10 },
        );

        let mut bad_pad = encode_bytes(b"abc");
        bad_pad[7] = 1;
        assert_eq!(
            decode_bytes(&bad_pad).expect_err("dirty padding must fail"),
            CodecError::NonZeroPadding,
        );
    }

    #[test]
    fn decode_rejects_truncated_group() {
        let encoded = encode_bytes(b"abcdefghij");
        let err = decode_bytes(&encoded[..12]).expect_err("truncated input must fail");
        assert!(matches!(err, CodecError::Truncated { .. }));
    }

    proptest! {
        #[test]
        fn encoding_preserves_byte_order(
            left in proptest::collection::vec(any::<u8>(), 0..40),
            right in proptest::collection::vec(any::<u8>(), 0..40),
        ) {
            prop_assert_eq!(left.cmp(&right), encode_bytes(&left).cmp(&encode_bytes(&right)));
        }

        #[test]
        fn encoded_length_is_predicted(data in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(encode_bytes(&data).len(), encoded_bytes_len(data.len()));
        }
    }
}
