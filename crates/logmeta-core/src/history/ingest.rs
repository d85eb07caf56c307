use crate::{
    error::InternalError,
    model::{ActionType, Job, JobState, ReorgType},
    types::UpstreamId,
};
use std::collections::BTreeMap;

///
/// IngestIndexInfo
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IngestIndexInfo {
    pub is_primary: bool,
    /// Set once the index definition has been refreshed after restore.
    pub updated: bool,
}

///
/// IngestRecorder
///
/// Indexes built through bulk ingestion, keyed by upstream table id then
/// upstream index id. Ingested index data bypasses the logged write path,
/// so these indexes must be rebuilt after restore.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IngestRecorder {
    items: BTreeMap<UpstreamId, BTreeMap<UpstreamId, IngestIndexInfo>>,
}

impl IngestRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `job` if it finished an ingest-backed index build.
    ///
    /// Returns the number of indexes recorded; jobs of any other kind are
    /// ignored. Sub-jobs of a bundled change count once done, standalone
    /// jobs once synced.
    pub fn try_add_job(&mut self, job: &Job, is_sub_job: bool) -> Result<usize, InternalError> {
        if !job.action.is_add_index() || job.reorg_type() != ReorgType::LitMerge {
            return Ok(0);
        }
        let finished =
            job.state == JobState::Synced || (is_sub_job && job.state == JobState::Done);
        if !finished {
            return Ok(0);
        }

        let index_ids = job.arg_ids(0)?;
        let is_primary = job.action == ActionType::AddPrimaryKey;
        let indexes = self.items.entry(UpstreamId::new(job.table_id)).or_default();
        for index_id in &index_ids {
            indexes.insert(
                UpstreamId::new(*index_id),
                IngestIndexInfo {
                    is_primary,
                    updated: false,
                },
            );
        }

        Ok(index_ids.len())
    }

    /// Mark one recorded index as refreshed. Returns false if it is unknown.
    pub fn mark_updated(&mut self, table_id: UpstreamId, index_id: UpstreamId) -> bool {
        match self
            .items
            .get_mut(&table_id)
            .and_then(|indexes| indexes.get_mut(&index_id))
        {
            Some(info) => {
                info.updated = true;
                true
            }
            None => false,
        }
    }

    /// Recorded `(table, index, info)` triples in id order.
    pub fn iter(&self) -> impl Iterator<Item = (UpstreamId, UpstreamId, &IngestIndexInfo)> {
        self.items.iter().flat_map(|(table_id, indexes)| {
            indexes
                .iter()
                .map(move |(index_id, info)| (*table_id, *index_id, info))
        })
    }

    /// Number of recorded indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.values().all(BTreeMap::is_empty)
    }
}
