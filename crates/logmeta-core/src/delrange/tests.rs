use super::*;
use crate::{
    error::ErrorClass,
    model::{ActionType, Job, JobState},
    replace::{DbMap, DbReplace, GlobalTableMap, TableReplace},
};
use serde_json::json;

fn down(id: i64) -> DownstreamId {
    DownstreamId::new(id)
}

fn up(id: i64) -> UpstreamId {
    UpstreamId::new(id)
}

// db U1→D1, table U10→D110 with partitions U100→D200, U101→D201,
// table U20→D120.
fn global() -> GlobalTableMap {
    let mut db_map = DbMap::new();
    db_map.insert(
        up(1),
        DbReplace::new("shop", down(1))
            .with_table(
                up(10),
                TableReplace::new("orders", down(110))
                    .with_partition(up(100), down(200))
                    .with_partition(up(101), down(201)),
            )
            .with_table(up(20), TableReplace::new("users", down(120))),
    );

    GlobalTableMap::from_db_map(&db_map)
}

fn recorder() -> DeleteRangeRecorder<Vec<PreDelRangeQuery>> {
    DeleteRangeRecorder::new(global(), Vec::new())
}

fn row(job_id: i64, elem_id: i64, start: &str, end: &str) -> DelRangeParams {
    DelRangeParams {
        job_id,
        elem_id,
        start_key: start.to_string(),
        end_key: end.to_string(),
    }
}

fn table_range(id: i64) -> (String, String) {
    (
        crate::codec::hex::encode_hex(&crate::codec::table::table_prefix(id)),
        crate::codec::hex::encode_hex(&crate::codec::table::table_prefix(id + 1)),
    )
}

//
// Recorder protocol
//

#[test]
fn prepare_append_consume_hands_query_to_sink() {
    let mut recorder = recorder();

    recorder.prepare(1);
    assert!(recorder.is_preparing());
    assert_eq!(recorder.rewrite_table_id(up(10)), Some(down(110)));
    recorder
        .append_row(row(7, 1, "aa", "ab"))
        .expect("append after prepare");
    recorder
        .consume("INSERT ...".to_string())
        .expect("consume after prepare");

    assert!(!recorder.is_preparing());
    assert_eq!(
        recorder.sink(),
        &vec![PreDelRangeQuery {
            sql: "INSERT ...".to_string(),
            rows: vec![row(7, 1, "aa", "ab")],
        }]
    );
}

#[test]
fn append_without_prepare_is_contract_violation() {
    let mut recorder = recorder();

    let err = recorder
        .append_row(row(7, 1, "aa", "ab"))
        .expect_err("append must require prepare");
    assert_eq!(err.class, ErrorClass::ContractViolation);
    assert!(recorder.sink().is_empty());
}

#[test]
fn consume_without_prepare_is_contract_violation() {
    let mut recorder = recorder();

    let err = recorder
        .consume(String::new())
        .expect_err("consume must require prepare");
    assert_eq!(err.class, ErrorClass::ContractViolation);
}

#[test]
fn double_consume_is_contract_violation() {
    let mut recorder = recorder();

    recorder.prepare(0);
    recorder.consume(String::new()).expect("first consume");
    let err = recorder
        .consume(String::new())
        .expect_err("second consume must fail");
    assert_eq!(err.class, ErrorClass::ContractViolation);
    assert_eq!(recorder.sink().len(), 1);
}

#[test]
fn re_prepare_discards_unfinished_rows() {
    let mut recorder = recorder();

    recorder.prepare(2);
    recorder.append_row(row(1, 1, "01", "02")).expect("append");
    recorder.prepare(1);
    recorder.append_row(row(2, 1, "03", "04")).expect("append");
    recorder.consume("sql".to_string()).expect("consume");

    let queries = recorder.into_sink();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].rows, vec![row(2, 1, "03", "04")]);
}

#[test]
fn rewrite_table_id_covers_tables_and_partitions() {
    let recorder = recorder();

    assert_eq!(recorder.rewrite_table_id(up(20)), Some(down(120)));
    assert_eq!(recorder.rewrite_table_id(up(101)), Some(down(201)));
    assert_eq!(recorder.rewrite_table_id(up(999)), None);
}

#[test]
fn closure_sink_receives_queries() {
    let mut seen = Vec::new();
    {
        let mut recorder = DeleteRangeRecorder::new(global(), |query: PreDelRangeQuery| {
            seen.push(query.rows.len());
        });
        recorder.prepare(1);
        recorder.append_row(row(1, 1, "00", "01")).expect("append");
        recorder.consume(String::new()).expect("consume");
    }

    assert_eq!(seen, vec![1]);
}

//
// Planner
//

#[test]
fn drop_table_emits_one_row_for_the_mapped_table() {
    let mut recorder = recorder();
    let mut job = Job::new(5, ActionType::DropTable, 1, 10);
    job.args = vec![json!(""), json!([]), json!([])];

    let rows = plan_delete_ranges(&mut recorder, &job).expect("plan");
    assert_eq!(rows, 1);

    let (start, end) = table_range(110);
    let queries = recorder.into_sink();
    assert_eq!(
        queries,
        vec![PreDelRangeQuery {
            sql: format!("{INSERT_DELETE_RANGE_SQL_PREFIX}{INSERT_DELETE_RANGE_SQL_VALUE}"),
            rows: vec![DelRangeParams {
                job_id: 5,
                elem_id: 1,
                start_key: start,
                end_key: end,
            }],
        }]
    );
}

#[test]
fn drop_partitioned_table_skips_unmapped_physical_ids() {
    let mut recorder = recorder();
    let mut job = Job::new(6, ActionType::DropTable, 1, 10);
    job.args = vec![json!(""), json!([100, 555, 101]), json!([])];

    let rows = plan_delete_ranges(&mut recorder, &job).expect("plan");
    assert_eq!(rows, 2);

    let queries = recorder.into_sink();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        queries[0].sql,
        format!(
            "{INSERT_DELETE_RANGE_SQL_PREFIX}{INSERT_DELETE_RANGE_SQL_VALUE},{INSERT_DELETE_RANGE_SQL_VALUE}"
        )
    );
    let elem_ids: Vec<i64> = queries[0].rows.iter().map(|row| row.elem_id).collect();
    assert_eq!(elem_ids, vec![1, 2]);
    assert_eq!(queries[0].rows[0].start_key, table_range(200).0);
    assert_eq!(queries[0].rows[1].start_key, table_range(201).0);
}

#[test]
fn fully_filtered_job_records_nothing() {
    let mut recorder = recorder();
    let job = Job::new(8, ActionType::TruncateTable, 9, 999);

    let rows = plan_delete_ranges(&mut recorder, &job).expect("plan");
    assert_eq!(rows, 0);
    assert!(recorder.sink().is_empty());
    assert!(!recorder.is_preparing());
}

#[test]
fn drop_schema_batches_table_ids() {
    let mut db_map = DbMap::new();
    let mut db = DbReplace::new("big", down(1));
    for id in 1..=130 {
        db = db.with_table(up(id), TableReplace::new(format!("t{id}"), down(id + 1000)));
    }
    db_map.insert(up(1), db);
    let mut recorder = DeleteRangeRecorder::new(GlobalTableMap::from_db_map(&db_map), Vec::new());

    let mut job = Job::new(11, ActionType::DropSchema, 1, 0);
    job.args = vec![json!((1..=130).collect::<Vec<i64>>())];

    let rows = plan_delete_ranges(&mut recorder, &job).expect("plan");
    assert_eq!(rows, 130);

    let queries = recorder.into_sink();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[0].rows.len(), 128);
    assert_eq!(queries[1].rows.len(), 2);
    assert_eq!(queries[1].rows[1].elem_id, 130);
}

#[test]
fn add_index_records_temp_index_per_partition() {
    let mut recorder = recorder();
    let mut job = Job::new(12, ActionType::AddIndex, 1, 10);
    job.args = vec![json!([3]), json!(false), json!([100, 101])];

    let rows = plan_delete_ranges(&mut recorder, &job).expect("plan");
    assert_eq!(rows, 2);

    let queries = recorder.into_sink();
    assert_eq!(queries.len(), 2);
    let temp = crate::codec::table::temp_index_id(3);
    assert_eq!(
        queries[0].rows[0].start_key,
        crate::codec::hex::encode_hex(&crate::codec::table::table_index_prefix(200, temp))
    );
    assert_eq!(
        queries[1].rows[0].start_key,
        crate::codec::hex::encode_hex(&crate::codec::table::table_index_prefix(201, temp))
    );
}

#[test]
fn rolled_back_add_index_also_removes_the_real_index() {
    let mut recorder = recorder();
    let mut job = Job::new(13, ActionType::AddPrimaryKey, 1, 20);
    job.state = JobState::RollbackDone;
    job.args = vec![json!(4)];

    let rows = plan_delete_ranges(&mut recorder, &job).expect("plan");
    assert_eq!(rows, 2);

    let queries = recorder.into_sink();
    let expected_first =
        crate::codec::hex::encode_hex(&crate::codec::table::table_index_prefix(120, 4));
    assert_eq!(queries[0].rows[0].start_key, expected_first);
    assert_eq!(queries[0].rows[1].elem_id, 2);
}

#[test]
fn drop_index_on_unmapped_table_skips_the_request() {
    let mut recorder = recorder();
    let mut job = Job::new(14, ActionType::DropIndex, 1, 999);
    job.args = vec![json!("idx"), json!(false), json!([3]), json!([])];

    let rows = plan_delete_ranges(&mut recorder, &job).expect("plan");
    assert_eq!(rows, 0);
    assert!(recorder.sink().is_empty());
}

#[test]
fn drop_column_without_indexes_records_nothing() {
    let mut recorder = recorder();
    let mut job = Job::new(15, ActionType::DropColumn, 1, 10);
    job.args = vec![json!("c"), json!(false), json!([]), json!([])];

    assert_eq!(plan_delete_ranges(&mut recorder, &job).expect("plan"), 0);
    assert!(recorder.sink().is_empty());
}

#[test]
fn modify_column_defaults_to_the_table_id() {
    let mut recorder = recorder();
    let mut job = Job::new(16, ActionType::ModifyColumn, 1, 20);
    job.args = vec![json!([5, 6]), json!([])];

    assert_eq!(plan_delete_ranges(&mut recorder, &job).expect("plan"), 2);
    let queries = recorder.into_sink();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].rows.len(), 2);
}

#[test]
fn bundled_job_plans_each_sub_job_that_needs_gc() {
    let mut recorder = recorder();
    let job = Job::decode(
        br#"{"id": 17, "type": 61, "schema_id": 1, "table_id": 20, "state": 6,
             "multi_schema_info": {"sub_jobs": [
                 {"type": 5, "state": 4},
                 {"type": 8, "args": ["i", false, [7], []], "state": 4}
             ]}}"#,
    )
    .expect("job should decode");

    assert_eq!(plan_delete_ranges(&mut recorder, &job).expect("plan"), 1);
    let queries = recorder.into_sink();
    assert_eq!(queries[0].rows[0].job_id, 17);
}

#[test]
fn malformed_args_name_the_job() {
    let mut recorder = recorder();
    let mut job = Job::new(18, ActionType::DropTablePartition, 1, 10);
    job.args = vec![json!({"not": "ids"})];

    let err = plan_delete_ranges(&mut recorder, &job).expect_err("args are malformed");
    assert_eq!(err.class, ErrorClass::Corruption);
    assert!(err.message.contains("job 18"));
}
