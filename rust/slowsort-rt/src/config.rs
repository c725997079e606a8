//! Runtime knobs for the sorter and the transformer.
//!
//! Both structs deserialize from partial TOML/JSON tables: any missing field
//! takes its default, so an empty `[sort]` section is valid.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Recursion depth below which the sorter forks child tasks.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Hard ceiling on `max_depth`. Depth `d` allows up to `2^d` runnable sort
/// tasks, so this caps a single sort at 256.
pub const MAX_PARALLEL_DEPTH: usize = 8;

/// Number of external doubling calls allowed in flight at once.
pub const DEFAULT_PERMITS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    pub max_depth: usize,
}

impl SortConfig {
    pub fn new(max_depth: usize) -> Result<Self, ConfigError> {
        let config = Self { max_depth };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth > MAX_PARALLEL_DEPTH {
            return Err(ConfigError::DepthTooLarge {
                requested: self.max_depth,
                limit: MAX_PARALLEL_DEPTH,
            });
        }
        Ok(())
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Capacity of the permit pool gating the external operation.
    pub permits: usize,
    /// Worker threads issuing calls. `None` means one per CPU.
    pub workers: Option<usize>,
}

impl TransformConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.permits == 0 {
            return Err(ConfigError::ZeroPermits);
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }

    /// Number of worker threads to use for a batch of `len` elements.
    ///
    /// Never more than the batch itself and never zero for a non-empty batch.
    pub fn worker_count(&self, len: usize) -> usize {
        let wanted = self.workers.unwrap_or_else(num_cpus::get).max(1);
        wanted.min(len)
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            permits: DEFAULT_PERMITS,
            workers: None,
        }
    }
}
