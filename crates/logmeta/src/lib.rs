//! logmeta: metadata rewrite for point-in-time log restore.
//!
//! ## Crate layout
//! - `core`: the rewrite engine, codecs, recorders, and observability.
//! - `config`: TOML restore configuration.
//! - `error`: the public error taxonomy.
//!
//! A restore driver loads a `RestoreConfig`, builds a `RestoreSession`, and
//! feeds every logged `(key, value, cf)` record through `rewrite`.

pub use logmeta_core as core;
pub use logmeta_primitives as primitives;

pub mod config;
pub mod error;
mod session;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use config::{DatabaseConfig, RestoreConfig, TableConfig};
pub use error::{ConfigError, Error, ErrorKind, ErrorOrigin};
pub use session::RestoreSession;

///
/// Driver Prelude
///

pub mod prelude {
    pub use crate::{
        config::RestoreConfig,
        core::{
            delrange::PreDelRangeQuery,
            obs::{CounterSink, RewriteReport},
            prelude::*,
        },
        error::Error,
        session::RestoreSession,
    };
}
