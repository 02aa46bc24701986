//! Error type for layout verification, canary checks and binding generation.

use libc::c_int;
use thiserror::Error;

/// Errors raised while checking or describing a transit layout.
///
/// Every layout variant is an integration defect: the two sides of the
/// boundary were built against different declarations and must be rebuilt in
/// lockstep. Nothing here is meant to be retried.
#[derive(Debug, Error)]
pub enum TransitError {
    #[error("field `{field}` of {schema} is at offset {actual}, expected {expected}")]
    FieldOffsetMismatch {
        schema: &'static str,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{schema} is {actual} bytes, expected {expected}")]
    SizeMismatch {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{schema} is aligned to {actual} bytes, expected {expected}")]
    AlignMismatch {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{schema} has {expected} fields, the far side reported {actual}")]
    FieldCountMismatch {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unknown schema version {0}")]
    UnknownSchema(u32),

    #[error("canary read back as {observed}, expected {expected}")]
    CanaryMismatch { expected: c_int, observed: c_int },

    #[error("callee never reported a canary observation")]
    NoCanaryObserved,

    #[error("callee mutated `{field}` of {schema}, which is not in its contract")]
    UndocumentedMutation {
        schema: &'static str,
        field: &'static str,
    },

    #[error("callee mutated the transit union, which is not in its contract")]
    UnionMutation,

    #[error("contract names `{field}`, which {schema} does not have")]
    UnknownContractField {
        schema: &'static str,
        field: &'static str,
    },

    #[error("invalid binding configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse binding configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransitError {
    /// True for errors that mean the two sides disagree on the memory layout.
    pub fn is_layout_drift(&self) -> bool {
        matches!(
            self,
            TransitError::FieldOffsetMismatch { .. }
                | TransitError::SizeMismatch { .. }
                | TransitError::AlignMismatch { .. }
                | TransitError::FieldCountMismatch { .. }
                | TransitError::CanaryMismatch { .. }
        )
    }
}
