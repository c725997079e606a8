//! Configuration file parsing for `slowsort.toml`.
//!
//! Searches the given directory then its ancestors, falling back to
//! `<config dir>/slowsort/slowsort.toml` if no project-level file is found.
//! Every section is optional; missing keys take the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slowsort_provider_process::DEFAULT_COMMAND;
use slowsort_rt::{SortConfig, TransformConfig, DEFAULT_PERMITS};

use crate::batch::{default_jobs, Job};
use crate::error::CliError;
use crate::permissions::DEFAULT_OUTPUT_MODE;

pub const CONFIG_FILE: &str = "slowsort.toml";

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct SlowsortConfig {
    #[serde(default)]
    pub sort: SortConfig,
    #[serde(default)]
    pub transform: TransformSection,
    #[serde(default)]
    pub output: OutputSection,
    /// Explicit input/output pairs. Empty means the built-in file set.
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TransformSection {
    pub permits: usize,
    pub workers: Option<usize>,
    /// Helper command; the value to double is appended as the last argument.
    pub command: String,
}

impl Default for TransformSection {
    fn default() -> Self {
        Self {
            permits: DEFAULT_PERMITS,
            workers: None,
            command: DEFAULT_COMMAND.to_string(),
        }
    }
}

impl TransformSection {
    pub fn limits(&self) -> TransformConfig {
        TransformConfig {
            permits: self.permits,
            workers: self.workers,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSection {
    /// Unix permission bits applied to every output file.
    pub mode: u32,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            mode: DEFAULT_OUTPUT_MODE,
        }
    }
}

impl SlowsortConfig {
    /// Find and load the nearest config, starting at `dir`.
    /// Returns `Default` when no file exists anywhere.
    pub fn load(dir: &Path) -> Result<Self, CliError> {
        match Self::discover(dir) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Path of the config file that [`load`](Self::load) would read.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        let mut dir = dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !dir.pop() {
                break;
            }
        }
        let global = dirs::config_dir()?.join("slowsort").join(CONFIG_FILE);
        global.is_file().then_some(global)
    }

    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        let config: Self = toml::from_str(&content).map_err(|source| CliError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse a TOML string directly (useful for testing and embedding).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn validate(&self) -> Result<(), CliError> {
        self.sort.validate()?;
        self.transform.limits().validate()?;
        Ok(())
    }

    /// Configured jobs, or the built-in file set when none are listed.
    pub fn jobs(&self) -> Vec<Job> {
        if self.jobs.is_empty() {
            default_jobs()
        } else {
            self.jobs.clone()
        }
    }

    /// Generate a default `slowsort.toml` template.
    pub fn default_template() -> &'static str {
        r#"# Slowsort configuration

[sort]
# Recursion depth below which sort halves run on their own threads (0-8).
max_depth = 4

[transform]
# External doubling calls allowed in flight at once.
permits = 2
# Worker threads issuing calls (defaults to one per CPU).
# workers = 4
# Helper program; the value is appended as the last argument.
command = "./calc.sh"

[output]
mode = 0o600

# Input/output pairs, relative to the working directory.
# Without any [[jobs]] the built-in 1-100.csv ... 501-600.csv set is used.
# [[jobs]]
# input = "1-100.csv"
# output = "2-200.csv"
"#
    }
}
