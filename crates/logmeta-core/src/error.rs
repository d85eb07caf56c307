use logmeta_primitives::CodecError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured rewrite error with a stable internal classification.
/// Not a stable API; the facade crate maps it into its public error type.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a corruption error for a specific origin.
    pub(crate) fn corruption(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, origin, message)
    }

    /// Construct a meta-key corruption error.
    pub(crate) fn meta_key_corruption(message: impl Into<String>) -> Self {
        Self::corruption(ErrorOrigin::MetaKey, message)
    }

    /// Construct a write-record corruption error.
    pub(crate) fn write_record_corruption(message: impl Into<String>) -> Self {
        Self::corruption(ErrorOrigin::WriteRecord, message)
    }

    /// Construct a descriptor corruption error.
    pub(crate) fn descriptor_corruption(message: impl Into<String>) -> Self {
        Self::corruption(ErrorOrigin::Descriptor, message)
    }

    /// Construct a job corruption error.
    pub(crate) fn job_corruption(message: impl Into<String>) -> Self {
        Self::corruption(ErrorOrigin::Job, message)
    }

    /// Construct a rewrite-origin invariant violation.
    ///
    /// Raised when the identifier maps themselves are inconsistent.
    pub(crate) fn rewrite_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Rewrite,
            message,
        )
    }

    /// Construct a contract violation for a specific origin.
    ///
    /// Contract violations are caller bugs, never data conditions.
    pub(crate) fn contract_violation(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::ContractViolation, origin, message)
    }

    /// Construct a serialize-origin internal error.
    pub(crate) fn serialize_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Serialize, message)
    }

    /// Construct a write-record unsupported error.
    pub(crate) fn write_record_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::WriteRecord, message)
    }

    /// Attach a codec failure to a corruption error for `origin`.
    pub(crate) fn from_codec(origin: ErrorOrigin, what: &str, err: CodecError) -> Self {
        Self::corruption(origin, format!("{what} decode failed: {err}"))
    }

    /// Prefix the message with the record it was raised for.
    #[must_use]
    pub(crate) fn with_context(mut self, context: impl fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }

    /// Return true when this error must abort the whole restore pass.
    #[must_use]
    pub const fn is_unrecoverable(&self) -> bool {
        matches!(
            self.class,
            ErrorClass::ContractViolation | ErrorClass::InvariantViolation
        )
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Malformed key, value, descriptor, or write record.
    Corruption,
    Internal,
    Unsupported,
    /// Identifier maps disagree with the records being rewritten.
    InvariantViolation,
    /// Caller misuse: unknown column family, recorder sequencing, nested bundles.
    ContractViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::ContractViolation => "contract_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Serialize,
    MetaKey,
    WriteRecord,
    Descriptor,
    Job,
    Rewrite,
    DeleteRange,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Serialize => "serialize",
            Self::MetaKey => "meta_key",
            Self::WriteRecord => "write_record",
            Self::Descriptor => "descriptor",
            Self::Job => "job",
            Self::Rewrite => "rewrite",
            Self::DeleteRange => "delete_range",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
