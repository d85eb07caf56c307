use super::*;
use crate::error::{ErrorClass, ErrorOrigin};
use proptest::prelude::*;

fn table_key(db: i64, table: i64, ts: u64) -> Vec<u8> {
    RawMetaKey::new(
        FieldShape::Database.encode(db),
        FieldShape::Table.encode(table),
        ts,
    )
    .encode()
}

#[test]
fn parse_recovers_scope_field_and_version() {
    let raw = table_key(1, 10, 42);
    let parsed = RawMetaKey::parse(&raw).expect("encoded meta key should parse");

    assert_eq!(parsed.key, b"DB:1");
    assert_eq!(parsed.field, b"Table:10");
    assert_eq!(parsed.ts, 42);
}

#[test]
fn namespace_classifies_meta_history_and_other_keys() {
    assert_eq!(KeyNamespace::of(&table_key(1, 10, 1)), KeyNamespace::Meta);

    let dbs = RawMetaKey::new("DBs", FieldShape::Database.encode(1), 1).encode();
    assert_eq!(KeyNamespace::of(&dbs), KeyNamespace::Meta);

    let history = RawMetaKey::new("DDLJobHistory", "80", 1).encode();
    assert_eq!(KeyNamespace::of(&history), KeyNamespace::JobHistory);

    let job_list = RawMetaKey::new("DDLJobList", "0", 1).encode();
    assert_eq!(KeyNamespace::of(&job_list), KeyNamespace::Other);

    let mut row = encode_bytes(b"t\x80\x00\x00\x00\x00\x00\x00\x0a_r");
    encode_u64_desc(&mut row, 1);
    assert_eq!(KeyNamespace::of(&row), KeyNamespace::Other);

    assert_eq!(KeyNamespace::of(b"short"), KeyNamespace::Other);
}

#[test]
fn truncated_meta_key_is_classified_and_rejected() {
    let raw = b"mDBs\0\0\0\0\xAB";
    assert_eq!(KeyNamespace::of(raw), KeyNamespace::Meta);

    let err = RawMetaKey::parse(raw).expect_err("truncated key must fail");
    assert_eq!(err.class, ErrorClass::Corruption);
    assert_eq!(err.origin, ErrorOrigin::MetaKey);
    assert!(err.message.contains("6d4442730000000000ab"), "{}", err.message);
}

#[test]
fn setters_change_only_their_part() {
    let mut parsed = RawMetaKey::parse(&table_key(1, 10, 7)).expect("meta key should parse");
    parsed.set_key(FieldShape::Database.encode(2));
    parsed.set_field(FieldShape::Table.encode(20));
    parsed.set_ts(99);

    assert_eq!(parsed.encode(), table_key(2, 20, 99));
}

#[test]
fn parse_rejects_missing_version_suffix() {
    let raw = table_key(1, 10, 7);
    let err = RawMetaKey::parse(&raw[..raw.len() - 3]).expect_err("short suffix must fail");

    assert_eq!(err.class, ErrorClass::Corruption);
    assert_eq!(err.origin, ErrorOrigin::MetaKey);
    assert!(err.message.contains("version suffix"), "unexpected error: {err:?}");
}

#[test]
fn parse_rejects_non_hash_structure_flag() {
    let mut txn_key = b"m".to_vec();
    encode_bytes_into(&mut txn_key, b"DB:1");
    encode_u64(&mut txn_key, u64::from(b'l'));
    encode_bytes_into(&mut txn_key, b"Table:1");
    let mut raw = encode_bytes(&txn_key);
    encode_u64_desc(&mut raw, 1);

    let err = RawMetaKey::parse(&raw).expect_err("list structure must be rejected");
    assert!(err.message.contains("type flag"), "unexpected error: {err:?}");
}

#[test]
fn field_shapes_do_not_shadow_each_other() {
    assert_eq!(FieldShape::table_scoped(b"Table:1"), Some(FieldShape::Table));
    assert_eq!(FieldShape::table_scoped(b"TID:1"), Some(FieldShape::AutoTableId));
    assert_eq!(FieldShape::table_scoped(b"TARID:1"), Some(FieldShape::AutoRandomTableId));
    assert_eq!(FieldShape::table_scoped(b"IID:1"), Some(FieldShape::AutoIncrementId));
    assert_eq!(FieldShape::table_scoped(b"SID:1"), Some(FieldShape::Sequence));
    assert_eq!(FieldShape::table_scoped(b"SequenceCycle:1"), None);
    assert_eq!(FieldShape::table_scoped(b"DB:1"), None);
    assert!(!FieldShape::Database.matches(b"DBs"));
}

#[test]
fn field_parse_reports_offending_field() {
    let err = FieldShape::Table
        .parse(b"Table:ten")
        .expect_err("non-numeric id must fail");

    assert_eq!(err.origin, ErrorOrigin::MetaKey);
    assert_eq!(err.message, "invalid table field 'Table:ten'");
    assert_eq!(FieldShape::Sequence.parse(b"SID:-3").expect("negative ids parse"), -3);
}

proptest! {
    #[test]
    fn any_encoded_key_parses_back(
        scope in proptest::collection::vec(any::<u8>(), 0..24),
        field in proptest::collection::vec(any::<u8>(), 0..24),
        ts in any::<u64>(),
    ) {
        let key = RawMetaKey::new(scope, field, ts);
        let parsed = RawMetaKey::parse(&key.encode()).expect("encoded key parses");
        prop_assert_eq!(parsed, key);
    }
}
