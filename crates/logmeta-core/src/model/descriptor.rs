use crate::{
    codec::{decode_descriptor, encode_descriptor},
    error::InternalError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped remainder of a descriptor object.
pub type Extra = Map<String, Value>;

///
/// DbInfo
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DbInfo {
    pub id: i64,

    #[serde(flatten)]
    pub extra: Extra,
}

impl DbInfo {
    pub fn decode(bytes: &[u8]) -> Result<Self, InternalError> {
        decode_descriptor(bytes, "db info")
    }

    pub fn encode(&self) -> Result<Vec<u8>, InternalError> {
        encode_descriptor(self, "db info")
    }

    /// Original-case database name, when present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        original_name(&self.extra, "db_name")
    }
}

///
/// TableInfo
///
/// Table descriptor. `partition` and `ttl_info` are typed because the
/// rewrite remaps partition ids and disables TTL.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableInfo {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<PartitionInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_info: Option<TtlInfo>,

    #[serde(flatten)]
    pub extra: Extra,
}

impl TableInfo {
    /// Id-only placeholder handed to hooks for deleted tables.
    #[must_use]
    pub fn minimal(id: i64) -> Self {
        Self {
            id,
            partition: None,
            ttl_info: None,
            extra: Extra::new(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, InternalError> {
        decode_descriptor(bytes, "table info")
    }

    pub fn encode(&self) -> Result<Vec<u8>, InternalError> {
        encode_descriptor(self, "table info")
    }

    /// Original-case table name, when present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        original_name(&self.extra, "name")
    }

    #[must_use]
    pub fn partition_ids(&self) -> Vec<i64> {
        self.partition
            .as_ref()
            .map(|info| info.definitions.iter().map(|def| def.id).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn ttl_enabled(&self) -> bool {
        self.ttl_info.as_ref().is_some_and(|ttl| ttl.enable)
    }
}

///
/// PartitionInfo
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PartitionInfo {
    #[serde(default)]
    pub definitions: Vec<PartitionDefinition>,

    #[serde(flatten)]
    pub extra: Extra,
}

///
/// PartitionDefinition
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PartitionDefinition {
    pub id: i64,

    #[serde(flatten)]
    pub extra: Extra,
}

///
/// TtlInfo
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TtlInfo {
    #[serde(default)]
    pub enable: bool,

    #[serde(flatten)]
    pub extra: Extra,
}

// Names are stored as `{"O": original, "L": lowercase}`.
fn original_name<'a>(extra: &'a Extra, field: &str) -> Option<&'a str> {
    extra.get(field)?.get("O")?.as_str()
}
