pub(crate) mod hex;
pub(crate) mod table;


use crate::{
    error::InternalError,
    serialize::{JsonError, from_json_bounded, to_json},
};
use serde::{Serialize, de::DeserializeOwned};

///
/// Metadata Codec
///
/// Metadata-specific decode wrappers over generic serialization helpers.
///
/// Policy lives here:
/// - payload size limits for persisted descriptor and job values
/// - error classification/origin for persisted payload failures
///
/// Format logic lives in `crate::serialize`.
///

/// Upper bound for one persisted descriptor or job payload.
pub(crate) const MAX_PAYLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Deserialize one persisted descriptor payload.
pub(crate) fn decode_descriptor<T>(bytes: &[u8], label: &'static str) -> Result<T, InternalError>
where
    T: DeserializeOwned,
{
    from_json_bounded(bytes, MAX_PAYLOAD_BYTES)
        .map_err(|source| InternalError::descriptor_corruption(decode_error_message(&source, label)))
}

/// Deserialize one historical job payload.
pub(crate) fn decode_job<T>(bytes: &[u8]) -> Result<T, InternalError>
where
    T: DeserializeOwned,
{
    from_json_bounded(bytes, MAX_PAYLOAD_BYTES)
        .map_err(|source| InternalError::job_corruption(decode_error_message(&source, "job")))
}

/// Serialize one rewritten descriptor payload.
pub(crate) fn encode_descriptor<T>(value: &T, label: &'static str) -> Result<Vec<u8>, InternalError>
where
    T: Serialize,
{
    to_json(value).map_err(|source| {
        InternalError::serialize_internal(format!("{label} encode failed: {}", source.kind()))
    })
}

// Stable message shape: the label plus the error kind, never backend text.
fn decode_error_message(source: &JsonError, label: &'static str) -> String {
    match source {
        JsonError::TooLarge { len, max_bytes } => {
            format!("{label} decode failed: payload size {len} exceeds limit {max_bytes}")
        }
        _ => format!("{label} decode failed: {}", source.kind()),
    }
}
