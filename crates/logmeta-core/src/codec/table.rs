//! Physical key prefixes for table rows and index entries.
//!
//! Only prefix construction is needed here: delete ranges cover
//! `[prefix(id), prefix(id + 1))`.

use logmeta_primitives::encode_i64_cmp;

const TABLE_PREFIX: u8 = b't';
const INDEX_PREFIX_SEP: &[u8] = b"_i";

/// Index ids at or above this mask address the temporary merge index.
pub(crate) const TEMP_INDEX_PREFIX: i64 = 0x7FFF_0000_0000_0000;

/// Physical prefix of every key owned by one table or partition.
#[must_use]
pub(crate) fn table_prefix(table_id: i64) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    out.push(TABLE_PREFIX);
    encode_i64_cmp(&mut out, table_id);
    out
}

/// Physical prefix of every entry owned by one index of one table.
#[must_use]
pub(crate) fn table_index_prefix(table_id: i64, index_id: i64) -> Vec<u8> {
    let mut out = table_prefix(table_id);
    out.extend_from_slice(INDEX_PREFIX_SEP);
    encode_i64_cmp(&mut out, index_id);
    out
}

/// Temporary index id used while an ingest-backed index build is merging.
#[must_use]
pub(crate) const fn temp_index_id(index_id: i64) -> i64 {
    TEMP_INDEX_PREFIX | index_id
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::hex::encode_hex;

    #[test]
    fn table_prefix_is_t_plus_comparable_id() {
        assert_eq!(encode_hex(&table_prefix(10)), "74800000000000000a");
    }

    #[test]
    fn index_prefix_extends_table_prefix() {
        let prefix = table_index_prefix(10, 2);
        assert!(prefix.starts_with(&table_prefix(10)));
        assert_eq!(encode_hex(&prefix), "74800000000000000a5f698000000000000002");
    }

    #[test]
    fn temp_index_id_sets_reserved_bits() {
        assert_eq!(temp_index_id(3), 0x7FFF_0000_0000_0003);
    }
}
