//! Module: rewrite
//! Responsibility: map one logged metadata record from the upstream to the
//! downstream identifier namespace, and route job-history records to replay.
//! Does not own: key/value codecs (see `meta`, `mvcc`, `model`) or range
//! planning (see `delrange`).
//!
//! Invariants:
//! - A record whose database or table is absent from the maps yields no
//!   output and no error.
//! - Surviving write-CF records carry the restore timestamp in their key.
//! - Surviving table descriptors have TTL disabled.

mod rules;

pub use rules::MetaRewriter;

use crate::{
    delrange::{DeleteRangeRecorder, DeleteRangeSink, PreDelRangeQuery},
    error::InternalError,
    history::{self, IngestRecorder, ReplayOutcome},
    meta::KeyNamespace,
    model::{Job, TableInfo},
    mvcc::ColumnFamily,
    obs::{DropReason, NoopSink, RewriteEvent, RewriteSink},
    replace::{DbMap, IdMaps},
    types::Timestamp,
};
use std::sync::Arc;

/// Type-erased delete-range sink owned by the engine.
type BoxedSink = Box<dyn FnMut(PreDelRangeQuery) + Send>;

///
/// KvEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KvEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl KvEntry {
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

///
/// TableRewrittenHook
///
/// Notified synchronously for every rewritten table descriptor. Deleted
/// tables are reported with an id-only placeholder.
///

pub trait TableRewrittenHook: Send + Sync {
    fn table_rewritten(&self, deleted: bool, table: &TableInfo);
}

impl<F> TableRewrittenHook for F
where
    F: Fn(bool, &TableInfo) + Send + Sync,
{
    fn table_rewritten(&self, deleted: bool, table: &TableInfo) {
        self(deleted, table);
    }
}

///
/// SchemasReplace
///
/// Identifier maps plus the replay state of one restore pass.
///
/// Metadata rewriting only reads the maps and can run from many threads
/// through `rewriter()`. Job replay mutates the recorders and therefore
/// takes `&mut self`.
///

pub struct SchemasReplace {
    maps: IdMaps,
    rewrite_ts: Timestamp,
    hook: Option<Box<dyn TableRewrittenHook>>,
    obs: Arc<dyn RewriteSink>,
    delete_range: DeleteRangeRecorder<BoxedSink>,
    ingest: IngestRecorder,
}

impl SchemasReplace {
    pub fn new(
        db_map: DbMap,
        rewrite_ts: Timestamp,
        mut sink: impl DeleteRangeSink + 'static,
    ) -> Self {
        let maps = IdMaps::new(db_map);
        let sink: BoxedSink = Box::new(move |query: PreDelRangeQuery| sink.record(query));
        let delete_range = DeleteRangeRecorder::new(maps.global().clone(), sink);

        Self {
            maps,
            rewrite_ts,
            hook: None,
            obs: Arc::new(NoopSink),
            delete_range,
            ingest: IngestRecorder::new(),
        }
    }

    #[must_use]
    pub fn with_table_rewritten_hook(mut self, hook: impl TableRewrittenHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn with_obs_sink(mut self, obs: Arc<dyn RewriteSink>) -> Self {
        self.obs = obs;
        self
    }

    #[must_use]
    pub const fn id_maps(&self) -> &IdMaps {
        &self.maps
    }

    #[must_use]
    pub const fn rewrite_ts(&self) -> Timestamp {
        self.rewrite_ts
    }

    #[must_use]
    pub const fn ingest_recorder(&self) -> &IngestRecorder {
        &self.ingest
    }

    pub const fn ingest_recorder_mut(&mut self) -> &mut IngestRecorder {
        &mut self.ingest
    }

    /// Shared, thread-safe view over the read-only rewrite state.
    #[must_use]
    pub fn rewriter(&self) -> MetaRewriter<'_> {
        MetaRewriter::new(
            &self.maps,
            self.rewrite_ts,
            self.hook.as_deref(),
            self.obs.as_ref(),
        )
    }

    /// Rewrite one logged record.
    ///
    /// Job-history records in the default CF are replayed and consumed;
    /// every other non-metadata record is dropped.
    pub fn rewrite_kv_entry(
        &mut self,
        entry: &KvEntry,
        cf: ColumnFamily,
    ) -> Result<Option<KvEntry>, InternalError> {
        match KeyNamespace::of(&entry.key) {
            KeyNamespace::Meta => self.rewriter().rewrite_classified(entry, cf),
            KeyNamespace::JobHistory if cf == ColumnFamily::Default => {
                self.replay_history_entry(entry)?;
                Ok(None)
            }
            KeyNamespace::JobHistory | KeyNamespace::Other => {
                self.record(RewriteEvent::EntryDropped {
                    reason: DropReason::NotMeta,
                });
                Ok(None)
            }
        }
    }

    /// Rewrite one logged record whose column family is given by name.
    pub fn rewrite_kv_entry_str(
        &mut self,
        entry: &KvEntry,
        cf: &str,
    ) -> Result<Option<KvEntry>, InternalError> {
        let cf = cf.parse::<ColumnFamily>()?;

        self.rewrite_kv_entry(entry, cf)
    }

    /// Replay one decoded historical job.
    pub fn restore_from_history(&mut self, job: &Job) -> Result<ReplayOutcome, InternalError> {
        let outcome = history::replay_job(job, &mut self.delete_range, &mut self.ingest)?;

        self.record(RewriteEvent::JobReplayed {
            needs_gc: outcome.needs_gc,
        });
        if outcome.delete_range_rows > 0 {
            self.record(RewriteEvent::DeleteRangeRecorded {
                rows: outcome.delete_range_rows as u64,
            });
        }
        if outcome.ingest_indexes > 0 {
            self.record(RewriteEvent::IngestRecorded {
                indexes: outcome.ingest_indexes as u64,
            });
        }

        Ok(outcome)
    }

    fn replay_history_entry(&mut self, entry: &KvEntry) -> Result<(), InternalError> {
        // Not every history value is a job record.
        let job = match Job::decode(&entry.value) {
            Ok(job) => job,
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    value_len = entry.value.len(),
                    "failed to decode the job"
                );
                self.record(RewriteEvent::EntryDropped {
                    reason: DropReason::UndecodableJob,
                });
                return Ok(());
            }
        };

        self.restore_from_history(&job)?;
        self.record(RewriteEvent::EntryDropped {
            reason: DropReason::HistoryConsumed,
        });

        Ok(())
    }

    fn record(&self, event: RewriteEvent) {
        self.obs.record(event);
    }
}
