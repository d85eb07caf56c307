//! Write column-family record codec.
//!
//! Layout: `write_type:u8 start_ts:varint` followed by optional tagged fields.
//! Parsing stops at the first unknown tag so newer trailing fields are
//! tolerated; encoding always emits the known fields in canonical order.

use crate::{
    error::{ErrorOrigin, InternalError},
    types::Timestamp,
};
use logmeta_primitives::{decode_u64, decode_uvarint, encode_u64, encode_uvarint};

const FLAG_SHORT_VALUE: u8 = b'v';
const FLAG_OVERLAPPED_ROLLBACK: u8 = b'R';
const FLAG_GC_FENCE: u8 = b'F';
const FLAG_LAST_CHANGE: u8 = b'l';
const FLAG_TXN_SOURCE: u8 = b'S';

/// Longest value that fits inline in a write record.
pub const MAX_SHORT_VALUE_LEN: usize = u8::MAX as usize;

///
/// WriteType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteType {
    Put,
    Delete,
    Lock,
    Rollback,
}

impl WriteType {
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Put => b'P',
            Self::Delete => b'D',
            Self::Lock => b'L',
            Self::Rollback => b'R',
        }
    }

    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'P' => Some(Self::Put),
            b'D' => Some(Self::Delete),
            b'L' => Some(Self::Lock),
            b'R' => Some(Self::Rollback),
            _ => None,
        }
    }
}

///
/// LastChange
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LastChange {
    pub ts: Timestamp,
    pub versions: u64,
}

///
/// WriteRecord
///
/// One decoded write column-family value.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WriteRecord {
    pub write_type: WriteType,
    pub start_ts: Timestamp,
    pub short_value: Option<Vec<u8>>,
    pub has_overlapped_rollback: bool,
    pub gc_fence: Option<Timestamp>,
    pub last_change: Option<LastChange>,
    pub txn_source: u64,
}

impl WriteRecord {
    #[must_use]
    pub const fn new(write_type: WriteType, start_ts: Timestamp) -> Self {
        Self {
            write_type,
            start_ts,
            short_value: None,
            has_overlapped_rollback: false,
            gc_fence: None,
            last_change: None,
            txn_source: 0,
        }
    }

    #[must_use]
    pub fn with_short_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.short_value = Some(value.into());
        self
    }

    #[must_use]
    pub const fn is_delete(&self) -> bool {
        matches!(self.write_type, WriteType::Delete)
    }

    #[must_use]
    pub const fn is_rollback(&self) -> bool {
        matches!(self.write_type, WriteType::Rollback)
    }

    /// Inline payload, if any. An empty inline value counts as absent.
    #[must_use]
    pub fn short_value(&self) -> Option<&[u8]> {
        self.short_value.as_deref().filter(|value| !value.is_empty())
    }

    pub fn set_short_value(&mut self, value: Vec<u8>) {
        self.short_value = Some(value);
    }

    /// Decode one write column-family value.
    pub fn parse(data: &[u8]) -> Result<Self, InternalError> {
        let Some((&type_byte, rest)) = data.split_first() else {
            return Err(InternalError::write_record_corruption("empty write record"));
        };
        let write_type = WriteType::from_byte(type_byte).ok_or_else(|| {
            InternalError::write_record_corruption(format!(
                "unknown write type 0x{type_byte:02x}"
            ))
        })?;
        let (start_ts, mut rest) = decode_uvarint(rest)
            .map_err(|err| InternalError::from_codec(ErrorOrigin::WriteRecord, "start ts", err))?;

        let mut record = Self::new(write_type, start_ts);

        while let Some((&flag, tail)) = rest.split_first() {
            match flag {
                FLAG_SHORT_VALUE => {
                    let Some((&len, tail)) = tail.split_first() else {
                        return Err(InternalError::write_record_corruption(
                            "short value length missing",
                        ));
                    };
                    let len = usize::from(len);
                    if tail.len() < len {
                        return Err(InternalError::write_record_corruption(format!(
                            "short value truncated: need {len} bytes, {} remaining",
                            tail.len()
                        )));
                    }
                    record.short_value = Some(tail[..len].to_vec());
                    rest = &tail[len..];
                }
                FLAG_OVERLAPPED_ROLLBACK => {
                    record.has_overlapped_rollback = true;
                    rest = tail;
                }
                FLAG_GC_FENCE => {
                    let (fence, tail) = decode_u64(tail).map_err(|err| {
                        InternalError::from_codec(ErrorOrigin::WriteRecord, "gc fence", err)
                    })?;
                    record.gc_fence = Some(fence);
                    rest = tail;
                }
                FLAG_LAST_CHANGE => {
                    let (ts, tail) = decode_u64(tail).map_err(|err| {
                        InternalError::from_codec(ErrorOrigin::WriteRecord, "last change ts", err)
                    })?;
                    let (versions, tail) = decode_uvarint(tail).map_err(|err| {
                        InternalError::from_codec(
                            ErrorOrigin::WriteRecord,
                            "versions to last change",
                            err,
                        )
                    })?;
                    record.last_change = Some(LastChange { ts, versions });
                    rest = tail;
                }
                FLAG_TXN_SOURCE => {
                    let (source, tail) = decode_uvarint(tail).map_err(|err| {
                        InternalError::from_codec(ErrorOrigin::WriteRecord, "txn source", err)
                    })?;
                    record.txn_source = source;
                    rest = tail;
                }
                _ => break,
            }
        }

        Ok(record)
    }

    /// Encode into the write column-family layout.
    pub fn encode(&self) -> Result<Vec<u8>, InternalError> {
        let short_len = self.short_value.as_ref().map_or(0, Vec::len);
        let mut out = Vec::with_capacity(16 + short_len);

        out.push(self.write_type.to_byte());
        encode_uvarint(&mut out, self.start_ts);

        if let Some(value) = self.short_value.as_ref().filter(|value| !value.is_empty()) {
            let len = u8::try_from(value.len()).map_err(|_| {
                InternalError::write_record_unsupported(format!(
                    "short value of {} bytes exceeds inline limit {MAX_SHORT_VALUE_LEN}",
                    value.len()
                ))
            })?;
            out.push(FLAG_SHORT_VALUE);
            out.push(len);
            out.extend_from_slice(value);
        }
        if self.has_overlapped_rollback {
            out.push(FLAG_OVERLAPPED_ROLLBACK);
        }
        if let Some(fence) = self.gc_fence {
            out.push(FLAG_GC_FENCE);
            encode_u64(&mut out, fence);
        }
        if let Some(last_change) = self.last_change {
            out.push(FLAG_LAST_CHANGE);
            encode_u64(&mut out, last_change.ts);
            encode_uvarint(&mut out, last_change.versions);
        }
        if self.txn_source > 0 {
            out.push(FLAG_TXN_SOURCE);
            encode_uvarint(&mut out, self.txn_source);
        }

        Ok(out)
    }
}
