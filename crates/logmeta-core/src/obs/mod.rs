//! Observability: rewrite telemetry and sink abstractions.
//!
//! Rewrite logic never aggregates counters itself; every outcome flows
//! through `RewriteEvent` into the installed `RewriteSink`.

pub(crate) mod sink;

pub use sink::{CounterSink, DropReason, NoopSink, RewriteEvent, RewriteReport, RewriteSink};
