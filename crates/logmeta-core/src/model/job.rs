//! Historical schema-change job records.
//!
//! Arguments are kept as the raw JSON array the job was persisted with;
//! typed accessors decode the positions each action defines.

use crate::{codec::decode_job, error::InternalError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Warning code recorded when a drop found nothing to drop.
const CANT_DROP_FIELD_OR_KEY: i64 = 1091;

///
/// ActionType
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "i64", into = "i64")]
pub enum ActionType {
    CreateSchema,
    DropSchema,
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
    AddIndex,
    DropIndex,
    TruncateTable,
    ModifyColumn,
    DropTablePartition,
    TruncateTablePartition,
    AddPrimaryKey,
    DropPrimaryKey,
    MultiSchemaChange,
    ReorganizePartition,
    AlterTablePartitioning,
    RemovePartitioning,
    Other(i64),
}

impl ActionType {
    const CODES: [(Self, i64); 18] = [
        (Self::CreateSchema, 1),
        (Self::DropSchema, 2),
        (Self::CreateTable, 3),
        (Self::DropTable, 4),
        (Self::AddColumn, 5),
        (Self::DropColumn, 6),
        (Self::AddIndex, 7),
        (Self::DropIndex, 8),
        (Self::TruncateTable, 11),
        (Self::ModifyColumn, 12),
        (Self::DropTablePartition, 20),
        (Self::TruncateTablePartition, 23),
        (Self::AddPrimaryKey, 32),
        (Self::DropPrimaryKey, 33),
        (Self::MultiSchemaChange, 61),
        (Self::ReorganizePartition, 64),
        (Self::AlterTablePartitioning, 71),
        (Self::RemovePartitioning, 72),
    ];

    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Other(code) => code,
            known => Self::CODES
                .iter()
                .find(|(action, _)| *action == known)
                .map_or(0, |(_, code)| *code),
        }
    }

    /// Actions that leave physical key ranges behind for background GC.
    #[must_use]
    pub const fn leaves_garbage(self) -> bool {
        matches!(
            self,
            Self::DropSchema
                | Self::DropTable
                | Self::TruncateTable
                | Self::DropIndex
                | Self::DropPrimaryKey
                | Self::DropTablePartition
                | Self::TruncateTablePartition
                | Self::DropColumn
                | Self::ModifyColumn
                | Self::AddIndex
                | Self::AddPrimaryKey
                | Self::ReorganizePartition
                | Self::RemovePartitioning
                | Self::AlterTablePartitioning
        )
    }

    #[must_use]
    pub const fn is_add_index(self) -> bool {
        matches!(self, Self::AddIndex | Self::AddPrimaryKey)
    }
}

impl From<i64> for ActionType {
    fn from(code: i64) -> Self {
        Self::CODES
            .iter()
            .find(|(_, known)| *known == code)
            .map_or(Self::Other(code), |(action, _)| *action)
    }
}

impl From<ActionType> for i64 {
    fn from(action: ActionType) -> Self {
        action.code()
    }
}

///
/// JobState
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "i64", into = "i64")]
pub enum JobState {
    #[default]
    None,
    Running,
    RollingBack,
    RollbackDone,
    Done,
    Cancelled,
    Synced,
    Cancelling,
    Queueing,
    Paused,
    Pausing,
}

impl From<i64> for JobState {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::Running,
            2 => Self::RollingBack,
            3 => Self::RollbackDone,
            4 => Self::Done,
            5 => Self::Cancelled,
            6 => Self::Synced,
            7 => Self::Cancelling,
            8 => Self::Queueing,
            9 => Self::Paused,
            10 => Self::Pausing,
            _ => Self::None,
        }
    }
}

impl From<JobState> for i64 {
    fn from(state: JobState) -> Self {
        match state {
            JobState::None => 0,
            JobState::Running => 1,
            JobState::RollingBack => 2,
            JobState::RollbackDone => 3,
            JobState::Done => 4,
            JobState::Cancelled => 5,
            JobState::Synced => 6,
            JobState::Cancelling => 7,
            JobState::Queueing => 8,
            JobState::Paused => 9,
            JobState::Pausing => 10,
        }
    }
}

///
/// ReorgType
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "i64", into = "i64")]
pub enum ReorgType {
    #[default]
    None,
    Txn,
    /// Index built by ingesting sorted files directly into storage.
    LitMerge,
    TxnMerge,
}

impl From<i64> for ReorgType {
    fn from(code: i64) -> Self {
        match code {
            1 => Self::Txn,
            2 => Self::LitMerge,
            3 => Self::TxnMerge,
            _ => Self::None,
        }
    }
}

impl From<ReorgType> for i64 {
    fn from(tp: ReorgType) -> Self {
        match tp {
            ReorgType::None => 0,
            ReorgType::Txn => 1,
            ReorgType::LitMerge => 2,
            ReorgType::TxnMerge => 3,
        }
    }
}

///
/// ReorgMeta
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReorgMeta {
    #[serde(default)]
    pub reorg_tp: ReorgType,
}

///
/// JobWarning
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct JobWarning {
    #[serde(default)]
    pub code: i64,
}

///
/// SubJob
///
/// One action of a bundled multi-action job.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SubJob {
    #[serde(rename = "type")]
    pub action: ActionType,

    #[serde(default, alias = "raw_args")]
    pub args: Vec<Value>,

    #[serde(default)]
    pub state: JobState,

    #[serde(default)]
    pub revertible: bool,

    #[serde(default)]
    pub warning: Option<JobWarning>,
}

impl SubJob {
    /// Expand this sub-job into a standalone job carrying the parent's
    /// identity, scope, and reorg settings.
    #[must_use]
    pub fn to_proxy_job(&self, parent: &Job, seq: usize) -> Job {
        Job {
            id: parent.id,
            action: self.action,
            schema_id: parent.schema_id,
            table_id: parent.table_id,
            state: self.state,
            reorg_meta: parent.reorg_meta.clone(),
            multi_schema_info: Some(MultiSchemaInfo {
                sub_jobs: Vec::new(),
                revertible: self.revertible,
                seq,
            }),
            args: self.args.clone(),
            warning: self.warning.clone(),
        }
    }
}

///
/// MultiSchemaInfo
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MultiSchemaInfo {
    #[serde(default)]
    pub sub_jobs: Vec<SubJob>,

    #[serde(default)]
    pub revertible: bool,

    #[serde(default)]
    pub seq: usize,
}

///
/// Job
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Job {
    pub id: i64,

    #[serde(rename = "type")]
    pub action: ActionType,

    #[serde(default)]
    pub schema_id: i64,

    #[serde(default)]
    pub table_id: i64,

    #[serde(default)]
    pub state: JobState,

    #[serde(default)]
    pub reorg_meta: Option<ReorgMeta>,

    #[serde(default)]
    pub multi_schema_info: Option<MultiSchemaInfo>,

    #[serde(default, alias = "raw_args")]
    pub args: Vec<Value>,

    #[serde(default)]
    pub warning: Option<JobWarning>,
}

impl Job {
    #[must_use]
    pub const fn new(id: i64, action: ActionType, schema_id: i64, table_id: i64) -> Self {
        Self {
            id,
            action,
            schema_id,
            table_id,
            state: JobState::Synced,
            reorg_meta: None,
            multi_schema_info: None,
            args: Vec::new(),
            warning: None,
        }
    }

    /// Decode one job from a history value.
    pub fn decode(bytes: &[u8]) -> Result<Self, InternalError> {
        decode_job(bytes)
    }

    #[must_use]
    pub const fn is_bundled(&self) -> bool {
        matches!(self.action, ActionType::MultiSchemaChange)
    }

    #[must_use]
    pub fn sub_jobs(&self) -> &[SubJob] {
        self.multi_schema_info
            .as_ref()
            .map(|info| info.sub_jobs.as_slice())
            .unwrap_or_default()
    }

    /// Expand every sub-job of a bundled job into proxy jobs.
    #[must_use]
    pub fn proxy_jobs(&self) -> Vec<Self> {
        self.sub_jobs()
            .iter()
            .enumerate()
            .map(|(seq, sub)| sub.to_proxy_job(self, seq))
            .collect()
    }

    #[must_use]
    pub fn reorg_type(&self) -> ReorgType {
        self.reorg_meta
            .as_ref()
            .map_or(ReorgType::None, |meta| meta.reorg_tp)
    }

    /// Return true if this job left physical ranges that must be reclaimed.
    #[must_use]
    pub fn needs_gc(&self) -> bool {
        if self.state == JobState::Cancelled {
            return false;
        }
        if self
            .warning
            .as_ref()
            .is_some_and(|warning| warning.code == CANT_DROP_FIELD_OR_KEY)
        {
            return false;
        }
        if self.is_bundled() {
            return self.proxy_jobs().iter().any(Self::needs_gc);
        }

        self.action.leaves_garbage()
    }

    /// Decode argument `idx` as a list of ids.
    ///
    /// A scalar id decodes as a one-element list; a missing or null argument
    /// decodes as empty.
    pub fn arg_ids(&self, idx: usize) -> Result<Vec<i64>, InternalError> {
        match self.args.get(idx) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Number(number)) => number
                .as_i64()
                .map(|id| vec![id])
                .ok_or_else(|| self.bad_arg(idx, "expected an integer id")),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_i64()
                        .ok_or_else(|| self.bad_arg(idx, "expected a list of integer ids"))
                })
                .collect(),
            Some(_) => Err(self.bad_arg(idx, "expected an id or a list of ids")),
        }
    }

    fn bad_arg(&self, idx: usize, detail: &str) -> InternalError {
        InternalError::job_corruption(format!(
            "job {} ({:?}): argument {idx}: {detail}",
            self.id, self.action
        ))
    }
}
