//! C-compatible type definitions for FFI.

use crate::error::TransitError;

/// Result status codes for FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitStatus {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer was passed.
    NullPointer = 1,
    /// Invalid argument.
    InvalidArgument = 2,
    /// Schema version is not known to this build.
    UnknownSchema = 3,
    /// The far side disagrees on size, alignment or offsets.
    LayoutMismatch = 4,
    /// The canary read back as something other than the magic value.
    CanaryMismatch = 5,
    /// Invalid UTF-8 string.
    InvalidUtf8 = 6,
    /// Logging was already initialised.
    AlreadyInitialized = 7,
}

impl From<&TransitError> for TransitStatus {
    fn from(err: &TransitError) -> Self {
        match err {
            TransitError::FieldOffsetMismatch { .. }
            | TransitError::SizeMismatch { .. }
            | TransitError::AlignMismatch { .. }
            | TransitError::FieldCountMismatch { .. } => TransitStatus::LayoutMismatch,
            TransitError::CanaryMismatch { .. } | TransitError::NoCanaryObserved => {
                TransitStatus::CanaryMismatch
            }
            TransitError::UnknownSchema(_) => TransitStatus::UnknownSchema,
            TransitError::UndocumentedMutation { .. }
            | TransitError::UnionMutation
            | TransitError::UnknownContractField { .. }
            | TransitError::InvalidConfig(_)
            | TransitError::Yaml(_)
            | TransitError::Io(_) => TransitStatus::InvalidArgument,
        }
    }
}

impl<T> From<Result<T, TransitError>> for TransitStatus {
    fn from(result: Result<T, TransitError>) -> Self {
        match result {
            Ok(_) => TransitStatus::Ok,
            Err(e) => TransitStatus::from(&e),
        }
    }
}

/// Log level for transit logging.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitLogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl From<TransitLogLevel> for log::LevelFilter {
    fn from(level: TransitLogLevel) -> Self {
        match level {
            TransitLogLevel::Off => log::LevelFilter::Off,
            TransitLogLevel::Error => log::LevelFilter::Error,
            TransitLogLevel::Warn => log::LevelFilter::Warn,
            TransitLogLevel::Info => log::LevelFilter::Info,
            TransitLogLevel::Debug => log::LevelFilter::Debug,
            TransitLogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
