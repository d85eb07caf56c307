//! Persisted metadata payloads: schema descriptors and schema-change jobs.
//!
//! Both are JSON documents. Only the fields the rewrite touches are typed;
//! everything else is carried through verbatim.

pub mod descriptor;
pub mod job;


pub use descriptor::{DbInfo, PartitionDefinition, PartitionInfo, TableInfo, TtlInfo};
pub use job::{ActionType, Job, JobState, JobWarning, MultiSchemaInfo, ReorgMeta, ReorgType, SubJob};
