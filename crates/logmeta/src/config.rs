//! Restore configuration: identifier correspondences and the restore
//! timestamp, read from TOML.
//!
//! ```toml
//! restore_ts = 4200
//!
//! [[databases]]
//! upstream_id = 1
//! downstream_id = 501
//! name = "shop"
//!
//! [[databases.tables]]
//! upstream_id = 10
//! downstream_id = 510
//! name = "orders"
//! partitions = [[100, 600], [101, 601]]
//! indexes = [[1, 1]]
//! ```

use crate::{
    error::{ConfigError, Error},
    session::RestoreSession,
};
use logmeta_core::{
    delrange::DeleteRangeSink,
    replace::{DbMap, DbReplace, TableReplace},
    rewrite::SchemasReplace,
    types::{DownstreamId, Timestamp, UpstreamId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// RestoreConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RestoreConfig {
    pub restore_ts: Timestamp,

    #[serde(default)]
    pub databases: Vec<DatabaseConfig>,
}

///
/// DatabaseConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub upstream_id: i64,
    pub downstream_id: i64,
    pub name: String,

    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

///
/// TableConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub upstream_id: i64,
    pub downstream_id: i64,
    pub name: String,

    /// `[upstream, downstream]` partition id pairs.
    #[serde(default)]
    pub partitions: Vec<(i64, i64)>,

    /// `[upstream, downstream]` index id pairs.
    #[serde(default)]
    pub indexes: Vec<(i64, i64)>,
}

impl RestoreConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config = toml::from_str(text).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Convert into the nested identifier map.
    ///
    /// Upstream table and partition ids share one physical namespace, so a
    /// repeat anywhere in the config is rejected.
    pub fn into_db_map(self) -> Result<DbMap, Error> {
        let mut db_map = DbMap::new();
        let mut physical_ids = BTreeSet::new();

        for db in self.databases {
            let db_id = UpstreamId::new(db.upstream_id);
            if db_map.contains_key(&db_id) {
                return Err(ConfigError::DuplicateDatabase { id: db.upstream_id }.into());
            }

            let mut db_replace = DbReplace::new(db.name, DownstreamId::new(db.downstream_id));
            for table in db.tables {
                let ids = std::iter::once(table.upstream_id)
                    .chain(table.partitions.iter().map(|(up, _)| *up));
                for id in ids {
                    if !physical_ids.insert(id) {
                        return Err(ConfigError::DuplicateTable {
                            db_id: db.upstream_id,
                            id,
                        }
                        .into());
                    }
                }

                db_replace = db_replace.with_table(
                    UpstreamId::new(table.upstream_id),
                    table_replace(table)?,
                );
            }
            db_map.insert(db_id, db_replace);
        }

        Ok(db_map)
    }

    /// Build a restore session that hands delete-range queries to `sink`.
    pub fn build(self, sink: impl DeleteRangeSink + 'static) -> Result<RestoreSession, Error> {
        let restore_ts = self.restore_ts;
        let db_map = self.into_db_map()?;
        tracing::debug!(
            restore_ts,
            databases = db_map.len(),
            "restore identifier maps loaded"
        );

        Ok(RestoreSession::new(SchemasReplace::new(db_map, restore_ts, sink)))
    }
}

fn table_replace(table: TableConfig) -> Result<TableReplace, Error> {
    let mut replace = TableReplace::new(table.name, DownstreamId::new(table.downstream_id));
    for (up, down) in table.partitions {
        replace = replace.with_partition(UpstreamId::new(up), DownstreamId::new(down));
    }

    let mut seen = BTreeSet::new();
    for (up, down) in table.indexes {
        if !seen.insert(up) {
            return Err(ConfigError::DuplicateIndex {
                table_id: table.upstream_id,
                id: up,
            }
            .into());
        }
        replace = replace.with_index(UpstreamId::new(up), DownstreamId::new(down));
    }

    Ok(replace)
}

///
/// TESTS
///
