//! Module: replace
//! Responsibility: upstream → downstream identifier maps for databases, tables,
//! partitions, and indexes.
//! Does not own: deciding which objects are restored; absence from these maps
//! already encodes that decision.
//! Boundary: built once before rewriting starts; read-only afterwards.
//!
//! Invariants:
//! - A missing database or table means "filtered out", never an error.
//! - The flattened global table map is derived once at construction.

#[cfg(test)]
mod tests;

use crate::types::{DownstreamId, UpstreamId};
use std::collections::BTreeMap;

///
/// TableReplace
///
/// Downstream identity of one table plus its partition and index id maps.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableReplace {
    pub name: String,
    pub table_id: DownstreamId,
    pub partition_map: BTreeMap<UpstreamId, DownstreamId>,
    pub index_map: BTreeMap<UpstreamId, DownstreamId>,
}

impl TableReplace {
    #[must_use]
    pub fn new(name: impl Into<String>, table_id: DownstreamId) -> Self {
        Self {
            name: name.into(),
            table_id,
            partition_map: BTreeMap::new(),
            index_map: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_partition(mut self, upstream: UpstreamId, downstream: DownstreamId) -> Self {
        self.partition_map.insert(upstream, downstream);
        self
    }

    #[must_use]
    pub fn with_index(mut self, upstream: UpstreamId, downstream: DownstreamId) -> Self {
        self.index_map.insert(upstream, downstream);
        self
    }

    #[must_use]
    pub fn lookup_partition(&self, upstream: UpstreamId) -> Option<DownstreamId> {
        self.partition_map.get(&upstream).copied()
    }

    #[must_use]
    pub fn lookup_index(&self, upstream: UpstreamId) -> Option<DownstreamId> {
        self.index_map.get(&upstream).copied()
    }
}

///
/// DbReplace
///
/// Downstream identity of one database plus its table map.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DbReplace {
    pub name: String,
    pub db_id: DownstreamId,
    pub table_map: BTreeMap<UpstreamId, TableReplace>,
}

impl DbReplace {
    #[must_use]
    pub fn new(name: impl Into<String>, db_id: DownstreamId) -> Self {
        Self {
            name: name.into(),
            db_id,
            table_map: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_table(mut self, upstream: UpstreamId, table: TableReplace) -> Self {
        self.table_map.insert(upstream, table);
        self
    }

    #[must_use]
    pub fn lookup_table(&self, upstream: UpstreamId) -> Option<&TableReplace> {
        self.table_map.get(&upstream)
    }
}

/// Database map keyed by upstream database id.
pub type DbMap = BTreeMap<UpstreamId, DbReplace>;

///
/// GlobalTableMap
///
/// Flattened upstream → downstream map over every table id and every
/// partition id of every database. Physical key ranges are addressed by
/// either kind of id, so delete-range rewriting looks both up here.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalTableMap {
    ids: BTreeMap<UpstreamId, DownstreamId>,
}

impl GlobalTableMap {
    /// Flatten every table and partition id under `db_map`.
    #[must_use]
    pub fn from_db_map(db_map: &DbMap) -> Self {
        let mut ids = BTreeMap::new();
        for db in db_map.values() {
            for (table_id, table) in &db.table_map {
                ids.insert(*table_id, table.table_id);
                ids.extend(table.partition_map.iter().map(|(up, down)| (*up, *down)));
            }
        }

        Self { ids }
    }

    #[must_use]
    pub fn lookup(&self, upstream: UpstreamId) -> Option<DownstreamId> {
        self.ids.get(&upstream).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

///
/// IdMaps
///
/// Owned, frozen identifier maps: the nested database map plus the derived
/// global table map.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IdMaps {
    db_map: DbMap,
    global: GlobalTableMap,
}

impl IdMaps {
    #[must_use]
    pub fn new(db_map: DbMap) -> Self {
        let global = GlobalTableMap::from_db_map(&db_map);

        Self { db_map, global }
    }

    #[must_use]
    pub fn lookup_database(&self, upstream: UpstreamId) -> Option<&DbReplace> {
        self.db_map.get(&upstream)
    }

    /// Two-level lookup used by every table-scoped key.
    #[must_use]
    pub fn lookup_db_table(
        &self,
        db: UpstreamId,
        table: UpstreamId,
    ) -> Option<(&DbReplace, &TableReplace)> {
        let db_replace = self.lookup_database(db)?;
        let table_replace = db_replace.lookup_table(table)?;

        Some((db_replace, table_replace))
    }

    #[must_use]
    pub fn lookup_global_table_or_partition(&self, upstream: UpstreamId) -> Option<DownstreamId> {
        self.global.lookup(upstream)
    }

    #[must_use]
    pub const fn db_map(&self) -> &DbMap {
        &self.db_map
    }

    #[must_use]
    pub const fn global(&self) -> &GlobalTableMap {
        &self.global
    }
}
