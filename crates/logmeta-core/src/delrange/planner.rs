use super::{DelRangeParams, DeleteRangeExecutor};
use crate::{
    codec::{
        hex::encode_hex,
        table::{table_index_prefix, table_prefix, temp_index_id},
    },
    error::InternalError,
    model::{ActionType, Job, JobState},
    types::UpstreamId,
};
use std::collections::BTreeMap;

pub const INSERT_DELETE_RANGE_SQL_PREFIX: &str = "INSERT IGNORE INTO mysql.gc_delete_range VALUES ";
pub const INSERT_DELETE_RANGE_SQL_VALUE: &str = "(%?, %?, %?, %?, %?)";

/// Upper bound on table ids per request when dropping a whole schema.
const DROP_SCHEMA_BATCH: usize = 128;

///
/// ElementIdAlloc
///
/// Element ids are unique per job: one per physical table and one per
/// (physical table, index) pair, allocated from 1 in first-seen order.
///

#[derive(Debug, Default)]
struct ElementIdAlloc {
    physical: BTreeMap<i64, i64>,
    indexes: BTreeMap<(i64, i64), i64>,
    next: i64,
}

impl ElementIdAlloc {
    fn alloc(&mut self) -> i64 {
        self.next += 1;
        self.next
    }

    fn for_physical_id(&mut self, physical_id: i64) -> i64 {
        if let Some(id) = self.physical.get(&physical_id) {
            return *id;
        }
        let id = self.alloc();
        self.physical.insert(physical_id, id);
        id
    }

    fn for_index_id(&mut self, physical_id: i64, index_id: i64) -> i64 {
        if let Some(id) = self.indexes.get(&(physical_id, index_id)) {
            return *id;
        }
        let id = self.alloc();
        self.indexes.insert((physical_id, index_id), id);
        id
    }
}

/// Emit every delete-range request `job` implies through `executor`.
///
/// Returns the number of rows recorded. Identifiers the executor cannot map
/// are skipped, never reported as errors.
pub fn plan_delete_ranges<E>(executor: &mut E, job: &Job) -> Result<usize, InternalError>
where
    E: DeleteRangeExecutor + ?Sized,
{
    executor.update_tso_for_job()?;

    let mut alloc = ElementIdAlloc::default();
    plan_job(executor, job, &mut alloc)
}

fn plan_job<E>(executor: &mut E, job: &Job, alloc: &mut ElementIdAlloc) -> Result<usize, InternalError>
where
    E: DeleteRangeExecutor + ?Sized,
{
    match job.action {
        ActionType::DropSchema => {
            let table_ids = job.arg_ids(0)?;
            let mut rows = 0;
            for batch in table_ids.chunks(DROP_SCHEMA_BATCH) {
                rows += delete_tables(executor, job.id, batch, alloc)?;
            }
            Ok(rows)
        }

        ActionType::DropTable | ActionType::TruncateTable => {
            let physical_ids = job.arg_ids(1)?;
            if physical_ids.is_empty() {
                delete_tables(executor, job.id, &[job.table_id], alloc)
            } else {
                delete_tables(executor, job.id, &physical_ids, alloc)
            }
        }

        ActionType::DropTablePartition
        | ActionType::TruncateTablePartition
        | ActionType::ReorganizePartition
        | ActionType::RemovePartitioning
        | ActionType::AlterTablePartitioning => {
            let physical_ids = job.arg_ids(0)?;
            delete_tables(executor, job.id, &physical_ids, alloc)
        }

        ActionType::AddIndex | ActionType::AddPrimaryKey => {
            let mut index_ids = Vec::new();
            for index_id in job.arg_ids(0)? {
                let temp_id = temp_index_id(index_id);
                if job.state == JobState::RollbackDone {
                    index_ids.push(index_id);
                }
                index_ids.push(temp_id);
            }
            let physical_ids = or_table_id(job.arg_ids(2)?, job.table_id);
            delete_indexes_per_physical(executor, job.id, &physical_ids, &index_ids, alloc)
        }

        ActionType::DropIndex | ActionType::DropPrimaryKey => {
            let index_ids = job.arg_ids(2)?;
            let physical_ids = or_table_id(job.arg_ids(3)?, job.table_id);
            delete_indexes_per_physical(executor, job.id, &physical_ids, &index_ids, alloc)
        }

        ActionType::DropColumn => {
            let index_ids = job.arg_ids(2)?;
            if index_ids.is_empty() {
                return Ok(0);
            }
            let physical_ids = or_table_id(job.arg_ids(3)?, job.table_id);
            delete_indexes_per_physical(executor, job.id, &physical_ids, &index_ids, alloc)
        }

        ActionType::ModifyColumn => {
            let index_ids = job.arg_ids(0)?;
            if index_ids.is_empty() {
                return Ok(0);
            }
            let physical_ids = or_table_id(job.arg_ids(1)?, job.table_id);
            delete_indexes_per_physical(executor, job.id, &physical_ids, &index_ids, alloc)
        }

        ActionType::MultiSchemaChange => {
            let mut rows = 0;
            for proxy in job.proxy_jobs() {
                if proxy.needs_gc() {
                    rows += plan_job(executor, &proxy, alloc)?;
                }
            }
            Ok(rows)
        }

        _ => Ok(0),
    }
}

fn or_table_id(physical_ids: Vec<i64>, table_id: i64) -> Vec<i64> {
    if physical_ids.is_empty() {
        vec![table_id]
    } else {
        physical_ids
    }
}

// One request covering every mapped physical id; unmapped ids are skipped.
fn delete_tables<E>(
    executor: &mut E,
    job_id: i64,
    table_ids: &[i64],
    alloc: &mut ElementIdAlloc,
) -> Result<usize, InternalError>
where
    E: DeleteRangeExecutor + ?Sized,
{
    let rows: Vec<DelRangeParams> = table_ids
        .iter()
        .filter_map(|id| executor.rewrite_table_id(UpstreamId::new(*id)))
        .map(|downstream| {
            let id = downstream.get();
            DelRangeParams {
                job_id,
                elem_id: alloc.for_physical_id(id),
                start_key: encode_hex(&table_prefix(id)),
                end_key: encode_hex(&table_prefix(id.saturating_add(1))),
            }
        })
        .collect();

    submit(executor, rows)
}

fn delete_indexes_per_physical<E>(
    executor: &mut E,
    job_id: i64,
    physical_ids: &[i64],
    index_ids: &[i64],
    alloc: &mut ElementIdAlloc,
) -> Result<usize, InternalError>
where
    E: DeleteRangeExecutor + ?Sized,
{
    let mut rows = 0;
    for physical_id in physical_ids {
        rows += delete_indexes(executor, job_id, *physical_id, index_ids, alloc)?;
    }

    Ok(rows)
}

// One request per physical table; an unmapped table skips the whole request.
fn delete_indexes<E>(
    executor: &mut E,
    job_id: i64,
    table_id: i64,
    index_ids: &[i64],
    alloc: &mut ElementIdAlloc,
) -> Result<usize, InternalError>
where
    E: DeleteRangeExecutor + ?Sized,
{
    let Some(downstream) = executor.rewrite_table_id(UpstreamId::new(table_id)) else {
        return Ok(0);
    };
    let table_id = downstream.get();

    let rows = index_ids
        .iter()
        .map(|index_id| DelRangeParams {
            job_id,
            elem_id: alloc.for_index_id(table_id, *index_id),
            start_key: encode_hex(&table_index_prefix(table_id, *index_id)),
            end_key: encode_hex(&table_index_prefix(table_id, index_id.saturating_add(1))),
        })
        .collect();

    submit(executor, rows)
}

// Requests with no surviving rows are never opened.
fn submit<E>(executor: &mut E, rows: Vec<DelRangeParams>) -> Result<usize, InternalError>
where
    E: DeleteRangeExecutor + ?Sized,
{
    if rows.is_empty() {
        return Ok(0);
    }

    let count = rows.len();
    let sql = render_sql(count);

    executor.prepare(count);
    for row in rows {
        executor.append_row(row)?;
    }
    executor.consume(sql)?;

    Ok(count)
}

fn render_sql(rows: usize) -> String {
    let mut sql = String::with_capacity(
        INSERT_DELETE_RANGE_SQL_PREFIX.len() + rows * (INSERT_DELETE_RANGE_SQL_VALUE.len() + 1),
    );
    sql.push_str(INSERT_DELETE_RANGE_SQL_PREFIX);
    for i in 0..rows {
        if i > 0 {
            sql.push(',');
        }
        sql.push_str(INSERT_DELETE_RANGE_SQL_VALUE);
    }

    sql
}
