//! Module: serialize
//! Responsibility: JSON encoding of persisted descriptor and job payloads.
//! Does not own: payload size policy or error classification; both live in
//! `crate::codec`.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::error::Category;
use std::fmt;
use thiserror::Error as ThisError;

///
/// JsonError
///

#[derive(Debug, ThisError)]
pub(crate) enum JsonError {
    #[error("json encode error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("json decode error: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("payload of {len} bytes exceeds limit {max_bytes}")]
    TooLarge { len: usize, max_bytes: usize },
}

impl JsonError {
    /// Classify without depending on backend message text.
    pub(crate) fn kind(&self) -> JsonErrorKind {
        match self {
            Self::Encode(_) => JsonErrorKind::Encode,
            Self::Decode(err) => match err.classify() {
                Category::Syntax => JsonErrorKind::Syntax,
                Category::Data => JsonErrorKind::Shape,
                Category::Eof => JsonErrorKind::Truncated,
                Category::Io => JsonErrorKind::Io,
            },
            Self::TooLarge { .. } => JsonErrorKind::TooLarge,
        }
    }
}

///
/// JsonErrorKind
///
/// Stable label for a JSON failure, safe to put in error messages.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JsonErrorKind {
    Encode,
    /// Input is not JSON.
    Syntax,
    /// Valid JSON that does not fit the expected structure.
    Shape,
    Truncated,
    Io,
    TooLarge,
}

impl JsonErrorKind {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Syntax => "syntax",
            Self::Shape => "shape",
            Self::Truncated => "truncated",
            Self::Io => "io",
            Self::TooLarge => "too_large",
        }
    }
}

impl fmt::Display for JsonErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode a value as compact JSON.
pub(crate) fn to_json<T>(value: &T) -> Result<Vec<u8>, JsonError>
where
    T: Serialize,
{
    serde_json::to_vec(value).map_err(JsonError::Encode)
}

/// Decode JSON no larger than `max_bytes`.
///
/// Trailing non-whitespace input is rejected.
pub(crate) fn from_json_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, JsonError>
where
    T: DeserializeOwned,
{
    if bytes.len() > max_bytes {
        return Err(JsonError::TooLarge {
            len: bytes.len(),
            max_bytes,
        });
    }

    serde_json::from_slice(bytes).map_err(JsonError::Decode)
}

///
/// TESTS
///
