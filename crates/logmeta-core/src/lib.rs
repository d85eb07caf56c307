//! Core engine for logmeta: rewrites logged schema metadata from the upstream
//! to the downstream identifier namespace during point-in-time restore, and
//! replays historical schema-change jobs for their side effects.
#![warn(unreachable_pub)]

pub(crate) mod codec;

// public exports are one module level down
pub mod delrange;
pub mod error;
pub mod history;
pub mod meta;
pub mod model;
pub mod mvcc;
pub mod obs;
pub mod replace;
pub mod rewrite;
pub(crate) mod serialize;
pub mod types;

pub use codec::hex::encode_hex;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, recorders, or codecs are re-exported here.
///

pub mod prelude {
    pub use crate::{
        mvcc::ColumnFamily,
        replace::{DbMap, DbReplace, TableReplace},
        rewrite::{KvEntry, SchemasReplace},
        types::{DownstreamId, Timestamp, UpstreamId},
    };
}
