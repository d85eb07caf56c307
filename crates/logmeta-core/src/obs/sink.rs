//! Rewrite sink boundary.
//!
//! Events are emitted synchronously from rewrite and replay paths; sinks
//! must not block.

use crate::{meta::FieldShape, mvcc::ColumnFamily};
use std::sync::atomic::{AtomicU64, Ordering};

///
/// DropReason
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DropReason {
    /// Database or table absent from the identifier maps.
    Filtered,
    /// Key outside the metadata and job-history namespaces.
    NotMeta,
    /// Metadata key nested under a scope other than a database.
    UnsupportedScope,
    /// Metadata field with no rewrite rule.
    UnknownField,
    /// Job-history entry, consumed by replay.
    HistoryConsumed,
    /// Job-history value that is not a job record.
    UndecodableJob,
}

///
/// RewriteEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RewriteEvent {
    EntryRewritten { shape: FieldShape, cf: ColumnFamily },
    EntryDropped { reason: DropReason },
    JobReplayed { needs_gc: bool },
    DeleteRangeRecorded { rows: u64 },
    IngestRecorded { indexes: u64 },
}

///
/// RewriteSink
///

pub trait RewriteSink: Send + Sync {
    fn record(&self, event: RewriteEvent);
}

///
/// NoopSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl RewriteSink for NoopSink {
    fn record(&self, _: RewriteEvent) {}
}

///
/// RewriteReport
///
/// Point-in-time snapshot of a `CounterSink`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewriteReport {
    pub databases_rewritten: u64,
    pub tables_rewritten: u64,
    pub counters_rewritten: u64,
    pub write_cf_entries: u64,
    pub entries_filtered: u64,
    pub entries_skipped: u64,
    pub jobs_replayed: u64,
    pub jobs_needing_gc: u64,
    pub jobs_undecodable: u64,
    pub delete_range_rows: u64,
    pub ingest_indexes: u64,
}

///
/// CounterSink
///
/// Thread-safe aggregating sink. Counters saturate.
///

#[derive(Debug, Default)]
pub struct CounterSink {
    databases_rewritten: AtomicU64,
    tables_rewritten: AtomicU64,
    counters_rewritten: AtomicU64,
    write_cf_entries: AtomicU64,
    entries_filtered: AtomicU64,
    entries_skipped: AtomicU64,
    jobs_replayed: AtomicU64,
    jobs_needing_gc: AtomicU64,
    jobs_undecodable: AtomicU64,
    delete_range_rows: AtomicU64,
    ingest_indexes: AtomicU64,
}

impl CounterSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn report(&self) -> RewriteReport {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        RewriteReport {
            databases_rewritten: load(&self.databases_rewritten),
            tables_rewritten: load(&self.tables_rewritten),
            counters_rewritten: load(&self.counters_rewritten),
            write_cf_entries: load(&self.write_cf_entries),
            entries_filtered: load(&self.entries_filtered),
            entries_skipped: load(&self.entries_skipped),
            jobs_replayed: load(&self.jobs_replayed),
            jobs_needing_gc: load(&self.jobs_needing_gc),
            jobs_undecodable: load(&self.jobs_undecodable),
            delete_range_rows: load(&self.delete_range_rows),
            ingest_indexes: load(&self.ingest_indexes),
        }
    }

    /// Reset every counter to zero.
    pub fn reset(&self) {
        for counter in [
            &self.databases_rewritten,
            &self.tables_rewritten,
            &self.counters_rewritten,
            &self.write_cf_entries,
            &self.entries_filtered,
            &self.entries_skipped,
            &self.jobs_replayed,
            &self.jobs_needing_gc,
            &self.jobs_undecodable,
            &self.delete_range_rows,
            &self.ingest_indexes,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

fn bump(counter: &AtomicU64, delta: u64) {
    // fetch_update only fails when the closure returns None.
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(delta))
    });
}

impl RewriteSink for CounterSink {
    fn record(&self, event: RewriteEvent) {
        match event {
            RewriteEvent::EntryRewritten { shape, cf } => {
                let counter = match shape {
                    FieldShape::Database => &self.databases_rewritten,
                    FieldShape::Table => &self.tables_rewritten,
                    _ => &self.counters_rewritten,
                };
                bump(counter, 1);
                if cf == ColumnFamily::Write {
                    bump(&self.write_cf_entries, 1);
                }
            }

            RewriteEvent::EntryDropped { reason } => match reason {
                DropReason::Filtered => bump(&self.entries_filtered, 1),
                DropReason::UndecodableJob => bump(&self.jobs_undecodable, 1),
                DropReason::HistoryConsumed => {}
                DropReason::NotMeta | DropReason::UnsupportedScope | DropReason::UnknownField => {
                    bump(&self.entries_skipped, 1);
                }
            },

            RewriteEvent::JobReplayed { needs_gc } => {
                bump(&self.jobs_replayed, 1);
                if needs_gc {
                    bump(&self.jobs_needing_gc, 1);
                }
            }

            RewriteEvent::DeleteRangeRecorded { rows } => bump(&self.delete_range_rows, rows),
            RewriteEvent::IngestRecorded { indexes } => bump(&self.ingest_indexes, indexes),
        }
    }
}

///
/// TESTS
///
