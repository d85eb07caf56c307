//! Module: history
//! Responsibility: replay finished schema-change jobs for their side effects.
//! Does not own: the job encoding (see `model::job`) or range planning (see
//! `delrange`).
//!
//! Replay has two independent effects:
//! - jobs that leave obsolete physical ranges queue delete-range requests
//! - ingest-backed index builds are recorded for rebuilding after restore

mod ingest;

pub use ingest::{IngestIndexInfo, IngestRecorder};

use crate::{
    delrange::{DeleteRangeExecutor, plan_delete_ranges},
    error::{ErrorOrigin, InternalError},
    model::Job,
};

///
/// ReplayOutcome
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReplayOutcome {
    pub needs_gc: bool,
    pub delete_range_rows: usize,
    pub ingest_indexes: usize,
}

/// Replay one historical job against the delete-range executor and the
/// ingest recorder.
///
/// A malformed bundle is rejected before either side effect runs.
pub fn replay_job<E>(
    job: &Job,
    executor: &mut E,
    ingest: &mut IngestRecorder,
) -> Result<ReplayOutcome, InternalError>
where
    E: DeleteRangeExecutor + ?Sized,
{
    let proxies = expand_bundle(job)?;

    let needs_gc = job.needs_gc();
    let delete_range_rows = if needs_gc {
        plan_delete_ranges(executor, job)?
    } else {
        0
    };
    let ingest_indexes = record_expanded(job, proxies.as_deref(), ingest)?;

    Ok(ReplayOutcome {
        needs_gc,
        delete_range_rows,
        ingest_indexes,
    })
}

/// Record ingest-backed index builds, expanding bundled jobs first.
pub fn record_ingest(job: &Job, ingest: &mut IngestRecorder) -> Result<usize, InternalError> {
    let proxies = expand_bundle(job)?;

    record_expanded(job, proxies.as_deref(), ingest)
}

fn record_expanded(
    job: &Job,
    proxies: Option<&[Job]>,
    ingest: &mut IngestRecorder,
) -> Result<usize, InternalError> {
    let Some(proxies) = proxies else {
        return ingest.try_add_job(job, false);
    };

    let mut recorded = 0;
    for proxy in proxies {
        recorded += ingest.try_add_job(proxy, true)?;
    }

    Ok(recorded)
}

// Sub-jobs of a bundle, or `None` for a plain job. Bundles nest one level only.
fn expand_bundle(job: &Job) -> Result<Option<Vec<Job>>, InternalError> {
    if !job.is_bundled() {
        return Ok(None);
    }

    let proxies = job.proxy_jobs();
    if let Some(nested) = proxies.iter().find(|proxy| proxy.is_bundled()) {
        return Err(InternalError::contract_violation(
            ErrorOrigin::Job,
            format!(
                "job {}: sub-job {} expands into another bundled job",
                job.id,
                nested.multi_schema_info.as_ref().map_or(0, |info| info.seq)
            ),
        ));
    }

    Ok(Some(proxies))
}
