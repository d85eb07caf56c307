//! Module: meta
//! Responsibility: parse and re-encode MVCC metadata keys, and classify raw
//! keys into the metadata and job-history namespaces.
//! Does not own: identifier lookup or value rewriting.
//!
//! Layout of one raw log key:
//! `bytes(txn_key) ++ u64_desc(ts)` where
//! `txn_key = "m" ++ bytes(key) ++ u64('h') ++ bytes(field)`.

mod field;
#[cfg(test)]
mod tests;

pub use field::FieldShape;

use crate::{
    codec::hex::encode_hex,
    error::{ErrorOrigin, InternalError},
    types::Timestamp,
};
use logmeta_primitives::{
    decode_bytes, decode_u64, decode_u64_desc, encode_bytes, encode_bytes_into, encode_u64,
    encode_u64_desc, encoded_bytes_len,
};

const META_PREFIX: &[u8] = b"m";
const META_DB_PREFIX: &[u8] = b"mDB";
const META_JOB_HISTORY_PREFIX: &[u8] = b"mDDLJobH";
const HASH_DATA_FLAG: u64 = b'h' as u64;
const TS_BYTES: usize = 8;

///
/// KeyNamespace
///
/// Coarse classification of a raw log key.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyNamespace {
    /// Database/table descriptors and per-table counters.
    Meta,
    /// Finished schema-change jobs.
    JobHistory,
    Other,
}

impl KeyNamespace {
    /// Classify a raw log key without decoding it.
    ///
    /// The first encoded group of a key carries its leading bytes verbatim,
    /// so namespace prefixes are matched on the raw key. A key that matches
    /// but then fails to decode is reported by [`RawMetaKey::parse`].
    #[must_use]
    pub fn of(raw_key: &[u8]) -> Self {
        if raw_key.starts_with(META_DB_PREFIX) {
            Self::Meta
        } else if raw_key.starts_with(META_JOB_HISTORY_PREFIX) {
            Self::JobHistory
        } else {
            Self::Other
        }
    }
}

///
/// RawMetaKey
///
/// One decoded metadata hash key: the owning scope (`key`), the record within
/// that scope (`field`), and the MVCC version suffix.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawMetaKey {
    pub key: Vec<u8>,
    pub field: Vec<u8>,
    pub ts: Timestamp,
}

impl RawMetaKey {
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>, field: impl Into<Vec<u8>>, ts: Timestamp) -> Self {
        Self {
            key: key.into(),
            field: field.into(),
            ts,
        }
    }

    /// Decode one raw log key into its metadata parts.
    pub fn parse(raw_key: &[u8]) -> Result<Self, InternalError> {
        let context = || encode_hex(raw_key);

        // Phase 1: split the txn key from its version suffix.
        let (txn_key, suffix) = decode_bytes(raw_key).map_err(|err| {
            InternalError::meta_key_corruption(format!("key {}: txn key decode failed: {err}", context()))
        })?;
        if suffix.len() != TS_BYTES {
            return Err(InternalError::meta_key_corruption(format!(
                "key {}: expected {TS_BYTES}-byte version suffix, found {}",
                context(),
                suffix.len()
            )));
        }
        let (ts, _) = decode_u64_desc(suffix)
            .map_err(|err| InternalError::from_codec(ErrorOrigin::MetaKey, "version suffix", err))?;

        // Phase 2: split the hash key into scope and field.
        let Some(body) = txn_key.strip_prefix(META_PREFIX) else {
            return Err(InternalError::meta_key_corruption(format!(
                "key {}: missing meta prefix",
                context()
            )));
        };
        let (key, rest) = decode_bytes(body).map_err(|err| {
            InternalError::meta_key_corruption(format!("key {}: scope decode failed: {err}", context()))
        })?;
        let (flag, rest) = decode_u64(rest).map_err(|err| {
            InternalError::meta_key_corruption(format!("key {}: type flag decode failed: {err}", context()))
        })?;
        if flag != HASH_DATA_FLAG {
            return Err(InternalError::meta_key_corruption(format!(
                "key {}: unsupported structure type flag {flag}",
                context()
            )));
        }
        let (field, rest) = decode_bytes(rest).map_err(|err| {
            InternalError::meta_key_corruption(format!("key {}: field decode failed: {err}", context()))
        })?;
        if !rest.is_empty() {
            return Err(InternalError::meta_key_corruption(format!(
                "key {}: {} trailing bytes after field",
                context(),
                rest.len()
            )));
        }

        Ok(Self { key, field, ts })
    }

    pub fn set_key(&mut self, key: Vec<u8>) {
        self.key = key;
    }

    pub fn set_field(&mut self, field: Vec<u8>) {
        self.field = field;
    }

    pub const fn set_ts(&mut self, ts: Timestamp) {
        self.ts = ts;
    }

    /// Re-encode into the raw log key layout.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut txn_key = Vec::with_capacity(
            META_PREFIX.len()
                + encoded_bytes_len(self.key.len())
                + TS_BYTES
                + encoded_bytes_len(self.field.len()),
        );
        txn_key.extend_from_slice(META_PREFIX);
        encode_bytes_into(&mut txn_key, &self.key);
        encode_u64(&mut txn_key, HASH_DATA_FLAG);
        encode_bytes_into(&mut txn_key, &self.field);

        let mut out = encode_bytes(&txn_key);
        encode_u64_desc(&mut out, self.ts);
        out
    }
}
