use super::*;

fn up(id: i64) -> UpstreamId {
    UpstreamId::new(id)
}

fn down(id: i64) -> DownstreamId {
    DownstreamId::new(id)
}

fn sample_maps() -> IdMaps {
    let orders = TableReplace::new("orders", down(10))
        .with_partition(up(100), down(1000))
        .with_partition(up(101), down(1001))
        .with_index(up(1), down(1));
    let users = TableReplace::new("users", down(20));

    let shop = DbReplace::new("shop", down(2))
        .with_table(up(11), orders)
        .with_table(up(21), users);

    IdMaps::new(DbMap::from([(up(1), shop)]))
}

#[test]
fn global_map_unions_tables_and_partitions() {
    let maps = sample_maps();

    assert_eq!(maps.global().len(), 4);
    assert_eq!(maps.lookup_global_table_or_partition(up(11)), Some(down(10)));
    assert_eq!(maps.lookup_global_table_or_partition(up(101)), Some(down(1001)));
    assert_eq!(maps.lookup_global_table_or_partition(up(21)), Some(down(20)));
    assert_eq!(maps.lookup_global_table_or_partition(up(1)), None);
}

#[test]
fn missing_objects_are_absent_not_errors() {
    let maps = sample_maps();

    assert!(maps.lookup_database(up(9)).is_none());
    assert!(maps.lookup_db_table(up(1), up(99)).is_none());
    assert!(maps.lookup_db_table(up(9), up(11)).is_none());
}

#[test]
fn nested_lookups_resolve_downstream_ids() {
    let maps = sample_maps();
    let (db, table) = maps
        .lookup_db_table(up(1), up(11))
        .expect("mapped table should resolve");

    assert_eq!(db.db_id, down(2));
    assert_eq!(table.table_id, down(10));
    assert_eq!(table.lookup_partition(up(100)), Some(down(1000)));
    assert_eq!(table.lookup_partition(up(102)), None);
    assert_eq!(table.lookup_index(up(1)), Some(down(1)));
}

#[test]
fn empty_db_map_builds_empty_global_map() {
    let maps = IdMaps::new(DbMap::new());
    assert!(maps.global().is_empty());
}
