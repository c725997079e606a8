//! Error types shared by the sorter, the transformer and the pipeline.

use std::fmt;

use thiserror::Error;

use crate::sort::IndexRange;

/// Errors raised while sorting.
///
/// A sort that fails leaves the sequence as a permutation of its input (the
/// sorter only ever swaps elements), but not necessarily ordered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error("range {range} is out of bounds for a sequence of length {len}")]
    RangeOutOfBounds { range: IndexRange, len: usize },
    #[error("max parallel depth {requested} exceeds the limit of {limit}")]
    DepthTooLarge { requested: usize, limit: usize },
    #[error("could not spawn sort task '{label}': {reason}")]
    ConcurrencyExhausted { label: String, reason: String },
    #[error("sort task '{label}' panicked: {message}")]
    TaskPanicked { label: String, message: String },
}

/// Errors raised when runtime knobs are out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("permit pool capacity must be at least 1")]
    ZeroPermits,
    #[error("max_depth {requested} exceeds the limit of {limit}")]
    DepthTooLarge { requested: usize, limit: usize },
    #[error("worker count must be at least 1")]
    ZeroWorkers,
}

/// A single failed call to the external doubling operation.
///
/// Providers build these; the transformer attaches the element position and
/// turns them into a [`TransformError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DoubleFailure(pub String);

impl DoubleFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// An element that could not be transformed.
///
/// The element is left out of the transformed sequence; `index` is its
/// position in the input and `value` the original, untransformed integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformError {
    pub index: usize,
    pub value: i64,
    pub detail: String,
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to transform value {} at index {}: {}",
            self.value, self.index, self.detail
        )
    }
}

impl std::error::Error for TransformError {}
