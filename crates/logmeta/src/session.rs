use crate::error::Error;
use logmeta_core::{
    history::{IngestRecorder, ReplayOutcome},
    model::{Job, TableInfo},
    obs::RewriteSink,
    rewrite::{KvEntry, MetaRewriter, SchemasReplace},
};
use std::sync::Arc;

///
/// RestoreSession
///
/// Public driver surface over the core engine: same operations, public
/// error type.
///

pub struct RestoreSession {
    inner: SchemasReplace,
}

impl RestoreSession {
    #[must_use]
    pub const fn new(inner: SchemasReplace) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn with_table_rewritten_hook<F>(self, hook: F) -> Self
    where
        F: Fn(bool, &TableInfo) + Send + Sync + 'static,
    {
        Self::new(self.inner.with_table_rewritten_hook(hook))
    }

    #[must_use]
    pub fn with_obs_sink(self, obs: Arc<dyn RewriteSink>) -> Self {
        Self::new(self.inner.with_obs_sink(obs))
    }

    /// Rewrite one logged record; `cf` is the column family name.
    pub fn rewrite(&mut self, entry: &KvEntry, cf: &str) -> Result<Option<KvEntry>, Error> {
        Ok(self.inner.rewrite_kv_entry_str(entry, cf)?)
    }

    /// Replay one historical job record given as its persisted bytes.
    pub fn replay_job(&mut self, value: &[u8]) -> Result<ReplayOutcome, Error> {
        let job = Job::decode(value)?;

        Ok(self.inner.restore_from_history(&job)?)
    }

    /// Thread-shareable metadata rewriter. Job-history records are not
    /// replayed through it.
    #[must_use]
    pub fn rewriter(&self) -> MetaRewriter<'_> {
        self.inner.rewriter()
    }

    #[must_use]
    pub const fn ingest_recorder(&self) -> &IngestRecorder {
        self.inner.ingest_recorder()
    }

    #[must_use]
    pub const fn engine(&self) -> &SchemasReplace {
        &self.inner
    }

    #[must_use]
    pub fn into_engine(self) -> SchemasReplace {
        self.inner
    }
}
