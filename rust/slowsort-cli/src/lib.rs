//! Slowsort command-line front end: CSV batches in, sorted doubled CSVs out.
#![warn(clippy::all)]

pub mod batch;
pub mod colors;
pub mod config;
pub mod csv_io;
pub mod error;
pub mod permissions;

pub use batch::{default_jobs, run_batch, BatchOptions, BatchReport, Job, JobReport};
pub use config::SlowsortConfig;
pub use error::CliError;
