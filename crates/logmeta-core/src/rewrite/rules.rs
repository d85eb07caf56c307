use super::{KvEntry, TableRewrittenHook};
use crate::{
    codec::hex::encode_hex,
    error::InternalError,
    meta::{FieldShape, KeyNamespace, RawMetaKey},
    model::{DbInfo, TableInfo},
    mvcc::{ColumnFamily, rewrite_value},
    obs::{DropReason, RewriteEvent, RewriteSink},
    replace::{IdMaps, TableReplace},
    types::{DownstreamId, Timestamp, UpstreamId},
};

///
/// Outcome
///

enum Outcome {
    Rewritten(FieldShape, KvEntry),
    Dropped(DropReason),
}

///
/// MetaRewriter
///
/// Borrowed view used by the per-shape rules. Holds nothing mutable, so one
/// view can be shared across threads.
///

#[derive(Clone, Copy)]
pub struct MetaRewriter<'a> {
    maps: &'a IdMaps,
    rewrite_ts: Timestamp,
    hook: Option<&'a dyn TableRewrittenHook>,
    obs: &'a dyn RewriteSink,
}

impl<'a> MetaRewriter<'a> {
    pub(crate) const fn new(
        maps: &'a IdMaps,
        rewrite_ts: Timestamp,
        hook: Option<&'a dyn TableRewrittenHook>,
        obs: &'a dyn RewriteSink,
    ) -> Self {
        Self {
            maps,
            rewrite_ts,
            hook,
            obs,
        }
    }

    /// Rewrite one record from the metadata namespace.
    ///
    /// Callers route job-history records through
    /// `SchemasReplace::rewrite_kv_entry`; here they are dropped unreplayed.
    pub fn rewrite_meta_entry(
        &self,
        entry: &KvEntry,
        cf: ColumnFamily,
    ) -> Result<Option<KvEntry>, InternalError> {
        if KeyNamespace::of(&entry.key) != KeyNamespace::Meta {
            return Ok(self.finish(cf, Outcome::Dropped(DropReason::NotMeta)));
        }

        self.rewrite_classified(entry, cf)
    }

    /// Rewrite a record already classified into the metadata namespace.
    pub(super) fn rewrite_classified(
        &self,
        entry: &KvEntry,
        cf: ColumnFamily,
    ) -> Result<Option<KvEntry>, InternalError> {
        let outcome = self.dispatch(entry, cf)?;

        Ok(self.finish(cf, outcome))
    }

    fn finish(&self, cf: ColumnFamily, outcome: Outcome) -> Option<KvEntry> {
        match outcome {
            Outcome::Rewritten(shape, entry) => {
                self.obs.record(RewriteEvent::EntryRewritten { shape, cf });
                Some(entry)
            }
            Outcome::Dropped(reason) => {
                self.obs.record(RewriteEvent::EntryDropped { reason });
                None
            }
        }
    }

    fn dispatch(&self, entry: &KvEntry, cf: ColumnFamily) -> Result<Outcome, InternalError> {
        let raw = RawMetaKey::parse(&entry.key)?;

        if FieldShape::Database.matches(&raw.field) {
            return self.rewrite_database(entry, raw, cf);
        }
        if !FieldShape::Database.matches(&raw.key) {
            return Ok(Outcome::Dropped(DropReason::UnsupportedScope));
        }

        match FieldShape::table_scoped(&raw.field) {
            Some(FieldShape::Table) => self.rewrite_table(entry, raw, cf),
            Some(shape) => self.rewrite_counter(entry, raw, shape, cf),
            None => Ok(Outcome::Dropped(DropReason::UnknownField)),
        }
    }

    // Database descriptor under the global `DBs` hash.
    fn rewrite_database(
        &self,
        entry: &KvEntry,
        mut raw: RawMetaKey,
        cf: ColumnFamily,
    ) -> Result<Outcome, InternalError> {
        let db_id = UpstreamId::new(FieldShape::Database.parse(&raw.field)?);
        let Some(db) = self.maps.lookup_database(db_id) else {
            return Ok(Outcome::Dropped(DropReason::Filtered));
        };

        let result = rewrite_value(&entry.value, cf, |value| {
            rewrite_db_info(value, db_id, db.db_id)
        })
        .map_err(|err| {
            err.with_context(format_args!("key {} (db {db_id})", encode_hex(&entry.key)))
        })?;

        raw.set_field(FieldShape::Database.encode(db.db_id.get()));
        let key = self.finish_key(raw, cf);

        Ok(Outcome::Rewritten(
            FieldShape::Database,
            KvEntry::new(key, result.value),
        ))
    }

    // Table descriptor under its database hash.
    fn rewrite_table(
        &self,
        entry: &KvEntry,
        mut raw: RawMetaKey,
        cf: ColumnFamily,
    ) -> Result<Outcome, InternalError> {
        let (db_id, table_id) = parse_table_scoped(&raw, FieldShape::Table)?;
        let Some((db, table)) = self.maps.lookup_db_table(db_id, table_id) else {
            return Ok(Outcome::Dropped(DropReason::Filtered));
        };

        let result = rewrite_value(&entry.value, cf, |value| {
            self.rewrite_table_info(value, table_id, table)
        })
        .map_err(|err| {
            err.with_context(format_args!(
                "key {} (db {db_id}, table {table_id})",
                encode_hex(&entry.key)
            ))
        })?;
        if result.deleted {
            self.notify(true, &TableInfo::minimal(table.table_id.get()));
        }

        raw.set_key(FieldShape::Database.encode(db.db_id.get()));
        raw.set_field(FieldShape::Table.encode(table.table_id.get()));
        let key = self.finish_key(raw, cf);

        Ok(Outcome::Rewritten(
            FieldShape::Table,
            KvEntry::new(key, result.value),
        ))
    }

    // Counters: only the key moves, the value is opaque.
    fn rewrite_counter(
        &self,
        entry: &KvEntry,
        mut raw: RawMetaKey,
        shape: FieldShape,
        cf: ColumnFamily,
    ) -> Result<Outcome, InternalError> {
        let (db_id, table_id) = parse_table_scoped(&raw, shape)?;
        let Some((db, table)) = self.maps.lookup_db_table(db_id, table_id) else {
            return Ok(Outcome::Dropped(DropReason::Filtered));
        };

        raw.set_key(FieldShape::Database.encode(db.db_id.get()));
        raw.set_field(shape.encode(table.table_id.get()));
        let key = self.finish_key(raw, cf);

        Ok(Outcome::Rewritten(
            shape,
            KvEntry::new(key, entry.value.clone()),
        ))
    }

    fn rewrite_table_info(
        &self,
        value: &[u8],
        upstream: UpstreamId,
        table: &TableReplace,
    ) -> Result<Vec<u8>, InternalError> {
        let mut info = TableInfo::decode(value)?;
        if info.id != upstream.get() {
            return Err(InternalError::descriptor_corruption(format!(
                "table info id {} does not match key table id {upstream}",
                info.id
            )));
        }

        info.id = table.table_id.get();
        if let Some(partition) = info.partition.as_mut() {
            for definition in &mut partition.definitions {
                let Some(downstream) = table.lookup_partition(UpstreamId::new(definition.id)) else {
                    tracing::error!(
                        partition_id = definition.id,
                        table_id = upstream.get(),
                        "expect partition info in table replace but got none"
                    );
                    return Err(InternalError::rewrite_invariant(format!(
                        "failed to find partition id {} of table {upstream} in replace maps",
                        definition.id
                    )));
                };
                definition.id = downstream.get();
            }
        }

        // Restored rows must not expire against the upstream clock.
        if let Some(ttl) = info.ttl_info.as_mut() {
            ttl.enable = false;
        }
        self.notify(false, &info);

        info.encode()
    }

    fn notify(&self, deleted: bool, table: &TableInfo) {
        if let Some(hook) = self.hook {
            hook.table_rewritten(deleted, table);
        }
    }

    fn finish_key(&self, mut raw: RawMetaKey, cf: ColumnFamily) -> Vec<u8> {
        if cf == ColumnFamily::Write {
            raw.set_ts(self.rewrite_ts);
        }

        raw.encode()
    }
}

fn rewrite_db_info(
    value: &[u8],
    upstream: UpstreamId,
    downstream: DownstreamId,
) -> Result<Vec<u8>, InternalError> {
    let mut info = DbInfo::decode(value)?;
    if info.id != upstream.get() {
        return Err(InternalError::descriptor_corruption(format!(
            "db info id {} does not match key db id {upstream}",
            info.id
        )));
    }

    info.id = downstream.get();
    info.encode()
}

fn parse_table_scoped(
    raw: &RawMetaKey,
    shape: FieldShape,
) -> Result<(UpstreamId, UpstreamId), InternalError> {
    let db_id = FieldShape::Database.parse(&raw.key)?;
    let table_id = shape.parse(&raw.field).inspect_err(|_| {
        tracing::warn!(
            field = %String::from_utf8_lossy(&raw.field),
            shape = shape.as_str(),
            "parse table key failed"
        );
    })?;

    Ok((UpstreamId::new(db_id), UpstreamId::new(table_id)))
}
