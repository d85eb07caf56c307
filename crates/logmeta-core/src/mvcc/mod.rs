//! Module: mvcc
//! Responsibility: expose the logical payload of a versioned value per column
//! family, and re-assemble the column-family encoding after rewriting.
//! Does not own: what the payload means; callers pass the rewrite function.
//!
//! Column families:
//! - `default` values are the whole payload.
//! - `write` values are version markers that may inline a short payload;
//!   larger payloads live in `default` and are rewritten there.

mod write;
#[cfg(test)]
mod tests;

pub use write::{LastChange, MAX_SHORT_VALUE_LEN, WriteRecord, WriteType};

use crate::error::{ErrorOrigin, InternalError};
use std::{fmt, str::FromStr};

///
/// ColumnFamily
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ColumnFamily {
    Default,
    Write,
}

impl ColumnFamily {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for ColumnFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnFamily {
    type Err = InternalError;

    /// Unknown tags are caller bugs, not data conditions.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "default" => Ok(Self::Default),
            "write" => Ok(Self::Write),
            other => Err(InternalError::contract_violation(
                ErrorOrigin::Rewrite,
                format!("unsupported column family '{other}'"),
            )),
        }
    }
}

///
/// RewriteResult
///
/// Re-assembled value plus whether the record marks a logical deletion.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewriteResult {
    pub value: Vec<u8>,
    pub deleted: bool,
}

impl RewriteResult {
    const fn live(value: Vec<u8>) -> Self {
        Self {
            value,
            deleted: false,
        }
    }
}

/// Apply `rewrite` to the logical payload of `value` under `cf`.
///
/// Delete and rollback markers, and write records without an inline value,
/// pass through byte-identical; `rewrite` is not called for them.
pub fn rewrite_value<F>(
    value: &[u8],
    cf: ColumnFamily,
    rewrite: F,
) -> Result<RewriteResult, InternalError>
where
    F: FnOnce(&[u8]) -> Result<Vec<u8>, InternalError>,
{
    match cf {
        ColumnFamily::Default => rewrite(value).map(RewriteResult::live),
        ColumnFamily::Write => {
            let mut record = WriteRecord::parse(value)?;

            if record.is_delete() {
                return Ok(RewriteResult {
                    value: value.to_vec(),
                    deleted: true,
                });
            }
            if record.is_rollback() {
                return Ok(RewriteResult::live(value.to_vec()));
            }
            let Some(short_value) = record.short_value() else {
                return Ok(RewriteResult::live(value.to_vec()));
            };

            let rewritten = rewrite(short_value).inspect_err(|_| {
                tracing::info!(
                    write_type = %char::from(record.write_type.to_byte()),
                    short_value_len = short_value.len(),
                    "failed to rewrite short value"
                );
            })?;

            record.set_short_value(rewritten);
            record.encode().map(RewriteResult::live)
        }
    }
}
