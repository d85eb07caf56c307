//! Identifier and timestamp vocabulary shared by every rewrite stage.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

///
/// UpstreamId
///
/// Object identifier allocated by the cluster that produced the backup.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct UpstreamId(i64);

impl UpstreamId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

///
/// DownstreamId
///
/// Object identifier allocated by the cluster being restored into.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, From, Hash, Into, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct DownstreamId(i64);

impl DownstreamId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// MVCC commit version.
pub type Timestamp = u64;
