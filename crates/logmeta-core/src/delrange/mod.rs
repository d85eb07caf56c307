//! Module: delrange
//! Responsibility: turn historical schema-change jobs into deferred
//! delete-range requests addressed by downstream identifiers.
//! Does not own: executing the requests; they are handed to a sink and run
//! after the restore completes.
//!
//! Protocol per request: `prepare` → `append_row`* → `consume`. The recorder
//! holds at most one open request.

mod planner;
#[cfg(test)]
mod tests;

pub use planner::{INSERT_DELETE_RANGE_SQL_PREFIX, INSERT_DELETE_RANGE_SQL_VALUE, plan_delete_ranges};

use crate::{
    error::{ErrorOrigin, InternalError},
    replace::GlobalTableMap,
    types::{DownstreamId, UpstreamId},
};

///
/// DelRangeParams
///
/// One row of a deferred delete-range request. Keys are lowercase hex.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelRangeParams {
    pub job_id: i64,
    pub elem_id: i64,
    pub start_key: String,
    pub end_key: String,
}

///
/// PreDelRangeQuery
///
/// A rendered insert statement plus the rows bound to its placeholders.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PreDelRangeQuery {
    pub sql: String,
    pub rows: Vec<DelRangeParams>,
}

///
/// DeleteRangeSink
///
/// Receives each finished query exactly once.
///

pub trait DeleteRangeSink: Send {
    fn record(&mut self, query: PreDelRangeQuery);
}

impl<F> DeleteRangeSink for F
where
    F: FnMut(PreDelRangeQuery) + Send,
{
    fn record(&mut self, query: PreDelRangeQuery) {
        self(query);
    }
}

impl DeleteRangeSink for Vec<PreDelRangeQuery> {
    fn record(&mut self, query: PreDelRangeQuery) {
        self.push(query);
    }
}

///
/// DeleteRangeExecutor
///
/// The seam the planner drives. Identifier rewriting happens here so the
/// planner stays unaware of upstream/downstream namespaces.
///

pub trait DeleteRangeExecutor {
    /// Commit-timestamp hook. Timestamps are assigned after restore, so
    /// implementations may do nothing.
    fn update_tso_for_job(&mut self) -> Result<(), InternalError>;

    /// Open a new request, discarding any unfinished one.
    fn prepare(&mut self, hint: usize);

    /// Map a physical table or partition id into the downstream namespace.
    fn rewrite_table_id(&self, upstream: UpstreamId) -> Option<DownstreamId>;

    fn append_row(&mut self, row: DelRangeParams) -> Result<(), InternalError>;

    /// Close the open request with its rendered statement.
    fn consume(&mut self, sql: String) -> Result<(), InternalError>;
}

///
/// RecorderState
///

#[derive(Debug, Default)]
enum RecorderState {
    #[default]
    Idle,
    Preparing(Vec<DelRangeParams>),
}

///
/// DeleteRangeRecorder
///

pub struct DeleteRangeRecorder<S> {
    global: GlobalTableMap,
    sink: S,
    state: RecorderState,
}

impl<S: DeleteRangeSink> DeleteRangeRecorder<S> {
    #[must_use]
    pub fn new(global: GlobalTableMap, sink: S) -> Self {
        Self {
            global,
            sink,
            state: RecorderState::Idle,
        }
    }

    #[must_use]
    pub const fn is_preparing(&self) -> bool {
        matches!(self.state, RecorderState::Preparing(_))
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: DeleteRangeSink> DeleteRangeExecutor for DeleteRangeRecorder<S> {
    fn update_tso_for_job(&mut self) -> Result<(), InternalError> {
        Ok(())
    }

    fn prepare(&mut self, hint: usize) {
        if let RecorderState::Preparing(rows) = &self.state {
            tracing::debug!(discarded_rows = rows.len(), "re-prepare discards open delete range");
        }
        self.state = RecorderState::Preparing(Vec::with_capacity(hint));
    }

    fn rewrite_table_id(&self, upstream: UpstreamId) -> Option<DownstreamId> {
        let downstream = self.global.lookup(upstream);
        if downstream.is_none() {
            tracing::warn!(
                upstream_table_id = upstream.get(),
                "failed to find the downstream id when rewriting delete range"
            );
        }

        downstream
    }

    fn append_row(&mut self, row: DelRangeParams) -> Result<(), InternalError> {
        let RecorderState::Preparing(rows) = &mut self.state else {
            return Err(InternalError::contract_violation(
                ErrorOrigin::DeleteRange,
                format!("append_row for job {} without prepare", row.job_id),
            ));
        };
        rows.push(row);

        Ok(())
    }

    fn consume(&mut self, sql: String) -> Result<(), InternalError> {
        let RecorderState::Preparing(rows) = std::mem::take(&mut self.state) else {
            return Err(InternalError::contract_violation(
                ErrorOrigin::DeleteRange,
                "consume without prepare",
            ));
        };
        self.sink.record(PreDelRangeQuery { sql, rows });

        Ok(())
    }
}
