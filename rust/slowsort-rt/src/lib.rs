//! Slowsort runtime: a bounded external value transform followed by a
//! deliberately slow, depth-bounded parallel sort.
//!
//! - [`permits`]: counting permit pool gating external calls.
//! - [`transform`]: order-preserving batch transform through a [`transform::Doubler`].
//! - [`sort`]: slowsort with fork/join below a maximum recursion depth.
//! - [`pipeline`]: transform then sort.
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod fork_join;
pub mod permits;
pub mod pipeline;
pub mod sort;
pub mod transform;

pub use config::{SortConfig, TransformConfig, DEFAULT_MAX_DEPTH, DEFAULT_PERMITS, MAX_PARALLEL_DEPTH};
pub use error::{ConfigError, DoubleFailure, SortError, TransformError};
pub use permits::{Permit, PermitPool};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use sort::{slow_sort, sort_all, IndexRange, SortStats, Sorter};
pub use transform::{ArithmeticDoubler, Doubler, TransformOutcome, Transformer};
