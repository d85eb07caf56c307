use super::*;
use crate::error::ErrorClass;

fn upper(value: &[u8]) -> Result<Vec<u8>, InternalError> {
    Ok(value.to_ascii_uppercase())
}

fn never(_: &[u8]) -> Result<Vec<u8>, InternalError> {
    panic!("rewrite must not be called for passthrough records");
}

#[test]
fn column_family_parses_known_tags_only() {
    assert_eq!("default".parse::<ColumnFamily>().expect("default cf"), ColumnFamily::Default);
    assert_eq!("write".parse::<ColumnFamily>().expect("write cf"), ColumnFamily::Write);

    let err = "lock".parse::<ColumnFamily>().expect_err("lock cf is unsupported");
    assert_eq!(err.class, ErrorClass::ContractViolation);
    assert!(err.is_unrecoverable());
    assert_eq!(err.message, "unsupported column family 'lock'");
}

#[test]
fn default_cf_rewrites_whole_value() {
    let result = rewrite_value(b"abc", ColumnFamily::Default, upper).expect("default rewrite");
    assert_eq!(result, RewriteResult { value: b"ABC".to_vec(), deleted: false });
}

#[test]
fn write_cf_rewrites_inline_value_and_keeps_other_fields() {
    let mut record = WriteRecord::new(WriteType::Put, 400_000).with_short_value("abc");
    record.gc_fence = Some(7);
    record.txn_source = 3;
    let raw = record.encode().expect("record encodes");

    let result = rewrite_value(&raw, ColumnFamily::Write, upper).expect("write rewrite");
    assert!(!result.deleted);

    let parsed = WriteRecord::parse(&result.value).expect("rewritten record parses");
    assert_eq!(parsed.short_value(), Some(&b"ABC"[..]));
    assert_eq!(parsed.start_ts, 400_000);
    assert_eq!(parsed.gc_fence, Some(7));
    assert_eq!(parsed.txn_source, 3);
}

#[test]
fn delete_marker_passes_through_and_reports_deletion() {
    let raw = WriteRecord::new(WriteType::Delete, 12).encode().expect("record encodes");
    let result = rewrite_value(&raw, ColumnFamily::Write, never).expect("delete passthrough");

    assert_eq!(result.value, raw);
    assert!(result.deleted);
}

#[test]
fn rollback_marker_passes_through_as_live() {
    let raw = WriteRecord::new(WriteType::Rollback, 12)
        .with_short_value("x")
        .encode()
        .expect("record encodes");
    let result = rewrite_value(&raw, ColumnFamily::Write, never).expect("rollback passthrough");

    assert_eq!(result.value, raw);
    assert!(!result.deleted);
}

#[test]
fn write_without_short_value_passes_through() {
    let raw = WriteRecord::new(WriteType::Put, 12).encode().expect("record encodes");
    let result = rewrite_value(&raw, ColumnFamily::Write, never).expect("passthrough");

    assert_eq!(result.value, raw);
    assert!(!result.deleted);
}

#[test]
fn empty_inline_value_passes_through() {
    let raw = [b'P', 0x05, b'v', 0];
    let parsed = WriteRecord::parse(&raw).expect("empty inline value parses");
    assert_eq!(parsed.short_value(), None);

    let result = rewrite_value(&raw, ColumnFamily::Write, never).expect("passthrough");
    assert_eq!(result.value, raw);
    assert!(!result.deleted);
}

#[test]
fn rewrite_errors_propagate() {
    let raw = WriteRecord::new(WriteType::Put, 1)
        .with_short_value("x")
        .encode()
        .expect("record encodes");
    let err = rewrite_value(&raw, ColumnFamily::Write, |_| {
        Err(InternalError::descriptor_corruption("bad payload"))
    })
    .expect_err("rewrite failure must propagate");

    assert_eq!(err.message, "bad payload");
}

#[test]
fn oversized_short_value_cannot_be_reencoded() {
    let raw = WriteRecord::new(WriteType::Put, 1)
        .with_short_value("x")
        .encode()
        .expect("record encodes");
    let err = rewrite_value(&raw, ColumnFamily::Write, |_| Ok(vec![b'y'; MAX_SHORT_VALUE_LEN + 1]))
        .expect_err("oversized inline value must fail");

    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn parse_tolerates_unknown_trailing_fields() {
    let mut raw = WriteRecord::new(WriteType::Put, 5)
        .with_short_value("ok")
        .encode()
        .expect("record encodes");
    raw.extend_from_slice(b"Zfuture");

    let parsed = WriteRecord::parse(&raw).expect("unknown tag stops parsing");
    assert_eq!(parsed.short_value(), Some(&b"ok"[..]));
}

#[test]
fn parse_rejects_malformed_records() {
    assert!(WriteRecord::parse(&[]).is_err());
    assert!(WriteRecord::parse(b"X\x01").is_err());
    assert!(WriteRecord::parse(b"P").is_err());
    assert!(WriteRecord::parse(b"P\x01v\x05ab").is_err());
    assert!(WriteRecord::parse(b"P\x01F\x00").is_err());
}

#[test]
fn all_optional_fields_survive_reencoding() {
    let mut record = WriteRecord::new(WriteType::Lock, 300).with_short_value("v");
    record.has_overlapped_rollback = true;
    record.gc_fence = Some(11);
    record.last_change = Some(LastChange { ts: 9, versions: 2 });
    record.txn_source = 1;

    let raw = record.encode().expect("record encodes");
    assert_eq!(WriteRecord::parse(&raw).expect("record parses"), record);
}
