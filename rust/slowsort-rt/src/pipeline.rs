//! Transform-then-sort over one batch of values.

use crate::config::SortConfig;
use crate::error::{ConfigError, SortError, TransformError};
use crate::sort::{SortStats, Sorter};
use crate::transform::{Doubler, Transformer};

/// Sorted output of one batch plus the elements that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub sorted: Vec<i64>,
    pub failures: Vec<TransformError>,
    pub stats: SortStats,
}

pub struct Pipeline<D> {
    transformer: Transformer<D>,
    sorter: Sorter,
}

impl<D: Doubler> Pipeline<D> {
    pub fn new(transformer: Transformer<D>, sort: SortConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            transformer,
            sorter: Sorter::new(sort)?,
        })
    }

    pub fn transformer(&self) -> &Transformer<D> {
        &self.transformer
    }

    pub fn sorter(&self) -> &Sorter {
        &self.sorter
    }

    /// Double every value, then slow-sort the ones that survived.
    ///
    /// Transform failures never abort the batch; only a sort failure does.
    pub fn run(&self, input: &[i64]) -> Result<PipelineOutcome, SortError> {
        let transformed = self.transformer.transform(input);
        let mut sorted = transformed.values;
        let stats = self.sorter.sort(&mut sorted)?;
        Ok(PipelineOutcome {
            sorted,
            failures: transformed.failures,
            stats,
        })
    }
}
