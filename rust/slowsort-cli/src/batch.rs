//! Batch runner: read, double, sort, write, restrict, for each job.
//!
//! A job that fails (unreadable input, sort failure, write failure) is
//! recorded in its [`JobReport`] and the batch moves on to the next one.
//! Elements the helper could not double are dropped from the output file
//! and listed in the report.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slowsort_rt::transform::Doubler;
use slowsort_rt::{Pipeline, TransformError};

use crate::csv_io;
use crate::error::CliError;
use crate::permissions;

/// One input file and the output file its sorted values go to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Job {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// The built-in file set: `1-100.csv` ... `501-600.csv`, written to
/// `2-200.csv` ... `1002-1200.csv`, since doubling every value doubles the
/// range each file covers.
pub fn default_jobs() -> Vec<Job> {
    let inputs = (1..601).step_by(100).map(|i| format!("{}-{}.csv", i, i + 99));
    let outputs = (2..1200).step_by(200).map(|i| format!("{}-{}.csv", i, i + 198));
    inputs.zip(outputs).map(|(i, o)| Job::new(i, o)).collect()
}

#[derive(Debug)]
pub struct JobReport {
    pub job: Job,
    /// Values written to the output file.
    pub written: usize,
    pub failures: Vec<TransformError>,
    /// Set when the job could not be completed.
    pub error: Option<CliError>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    /// Every job completed and every element was transformed.
    pub fn is_clean(&self) -> bool {
        self.jobs
            .iter()
            .all(|j| j.succeeded() && j.failures.is_empty())
    }

    pub fn failed_jobs(&self) -> usize {
        self.jobs.iter().filter(|j| !j.succeeded()).count()
    }

    pub fn element_failures(&self) -> usize {
        self.jobs.iter().map(|j| j.failures.len()).sum()
    }
}

/// Options shared by every job in a batch.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory job paths are resolved against.
    pub base_dir: PathBuf,
    /// Permission bits for output files.
    pub mode: u32,
}

pub fn run_batch<D: Doubler>(
    jobs: &[Job],
    pipeline: &Pipeline<D>,
    options: &BatchOptions,
) -> BatchReport {
    let mut report = BatchReport::default();
    for job in jobs {
        let job_report = run_job(job, pipeline, options);
        match &job_report.error {
            None => tracing::info!(
                input = %job.input.display(),
                output = %job.output.display(),
                written = job_report.written,
                failed = job_report.failures.len(),
                "job finished"
            ),
            Some(e) => tracing::error!(input = %job.input.display(), error = %e, "job failed"),
        }
        report.jobs.push(job_report);
    }
    report
}

fn run_job<D: Doubler>(job: &Job, pipeline: &Pipeline<D>, options: &BatchOptions) -> JobReport {
    let mut report = JobReport {
        job: job.clone(),
        written: 0,
        failures: Vec::new(),
        error: None,
    };
    if let Err(e) = process(job, pipeline, options, &mut report) {
        report.error = Some(e);
    }
    report
}

fn process<D: Doubler>(
    job: &Job,
    pipeline: &Pipeline<D>,
    options: &BatchOptions,
    report: &mut JobReport,
) -> Result<(), CliError> {
    let input = resolve(&options.base_dir, &job.input);
    let output = resolve(&options.base_dir, &job.output);

    let values = csv_io::read_values(&input)?;
    let outcome = pipeline.run(&values)?;
    report.failures = outcome.failures;

    csv_io::write_values(&output, &outcome.sorted)?;
    permissions::restrict(&output, options.mode)?;
    report.written = outcome.sorted.len();
    Ok(())
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
