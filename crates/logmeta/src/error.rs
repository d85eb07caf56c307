use derive_more::Display;
use logmeta_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Return true when the restore pass must stop rather than skip a batch.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvariantViolation | ErrorKind::ContractViolation
        )
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid restore config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate upstream database id {id}")]
    DuplicateDatabase { id: i64 },

    #[error("duplicate upstream table or partition id {id} (database {db_id})")]
    DuplicateTable { db_id: i64, id: i64 },

    #[error("duplicate upstream index id {id} (table {table_id})")]
    DuplicateIndex { table_id: i64, id: i64 },
}

///
/// ErrorKind
/// Public error taxonomy for restore drivers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// A logged key, value, or descriptor could not be decoded.
    Corruption,

    /// The identifier maps disagree with the logged metadata.
    InvariantViolation,

    /// The caller broke an API contract.
    ContractViolation,

    Unsupported,

    /// The restore configuration is invalid.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Corruption => Self::Corruption,
            ErrorClass::InvariantViolation => Self::InvariantViolation,
            ErrorClass::ContractViolation => Self::ContractViolation,
            ErrorClass::Unsupported => Self::Unsupported,
            ErrorClass::Internal => Self::Internal,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for restore drivers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    DeleteRange,
    Descriptor,
    Job,
    MetaKey,
    Rewrite,
    Serialize,
    WriteRecord,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::DeleteRange => Self::DeleteRange,
            CoreErrorOrigin::Descriptor => Self::Descriptor,
            CoreErrorOrigin::Job => Self::Job,
            CoreErrorOrigin::MetaKey => Self::MetaKey,
            CoreErrorOrigin::Rewrite => Self::Rewrite,
            CoreErrorOrigin::Serialize => Self::Serialize,
            CoreErrorOrigin::WriteRecord => Self::WriteRecord,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_keep_class_and_origin() {
        let internal = InternalError::new(
            ErrorClass::InvariantViolation,
            CoreErrorOrigin::Rewrite,
            "missing partition",
        );
        let err = Error::from(internal);

        assert_eq!(err.kind, ErrorKind::InvariantViolation);
        assert_eq!(err.origin, ErrorOrigin::Rewrite);
        assert_eq!(err.message, "missing partition");
        assert!(err.is_fatal());
    }

    #[test]
    fn config_errors_map_to_config_kind() {
        let err = Error::from(ConfigError::DuplicateDatabase { id: 3 });

        assert_eq!(err.kind, ErrorKind::Config);
        assert_eq!(err.origin, ErrorOrigin::Config);
        assert_eq!(err.to_string(), "duplicate upstream database id 3");
        assert!(!err.is_fatal());
    }
}
