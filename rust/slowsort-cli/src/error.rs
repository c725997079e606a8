//! Errors surfaced by the command-line front end.

use std::io;
use std::path::PathBuf;

use slowsort_provider_process::ProcessError;
use slowsort_rt::{ConfigError, SortError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed csv in '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("'{}' line {line}: '{text}' is not an integer", path.display())]
    NotAnInteger {
        path: PathBuf,
        line: u64,
        text: String,
    },
    #[error("'{}' line {line}: expected one value, found '{record}'", path.display())]
    ExtraFields {
        path: PathBuf,
        line: u64,
        record: String,
    },
    #[error("invalid toml in '{}': {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("sort failed: {0}")]
    Sort(#[from] SortError),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl CliError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CliError::Io {
            path: path.into(),
            source,
        }
    }
}
