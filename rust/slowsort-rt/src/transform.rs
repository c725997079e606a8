//! Value transformer: applies the external doubling operation to a batch.
//!
//! Elements are independent, so a small pool of worker threads pulls element
//! indices off a shared queue and calls the [`Doubler`] for each. Every call
//! holds a [`Permit`](crate::permits::Permit) from the caller's
//! [`PermitPool`], so no matter how many workers run, at most
//! `pool.capacity()` calls are in flight.
//!
//! Results are written back by index, so the output keeps input order even
//! when calls complete out of order. An element whose call fails is left out
//! of [`TransformOutcome::values`] and reported once in
//! [`TransformOutcome::failures`]; the rest of the batch carries on.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel as cb;

use crate::config::TransformConfig;
use crate::error::{ConfigError, DoubleFailure, TransformError};
use crate::fork_join::panic_message;
use crate::permits::PermitPool;

// ---------------------------------------------------------------------------
// Doubler
// ---------------------------------------------------------------------------

/// The external `int -> int` operation, which may fail per value.
pub trait Doubler: Send + Sync {
    fn double(&self, value: i64) -> Result<i64, DoubleFailure>;
}

impl<F> Doubler for F
where
    F: Fn(i64) -> Result<i64, DoubleFailure> + Send + Sync,
{
    fn double(&self, value: i64) -> Result<i64, DoubleFailure> {
        self(value)
    }
}

/// In-process doubler, useful when no helper program is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticDoubler;

impl Doubler for ArithmeticDoubler {
    fn double(&self, value: i64) -> Result<i64, DoubleFailure> {
        value
            .checked_mul(2)
            .ok_or_else(|| DoubleFailure::new(format!("doubling {} overflows i64", value)))
    }
}

// ---------------------------------------------------------------------------
// TransformOutcome
// ---------------------------------------------------------------------------

/// Result of transforming one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutcome {
    /// Transformed values of the elements that succeeded, in input order.
    pub values: Vec<i64>,
    /// One entry per failed element, ordered by input index.
    pub failures: Vec<TransformError>,
}

impl TransformOutcome {
    /// `true` when no element failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Transformer
// ---------------------------------------------------------------------------

pub struct Transformer<D> {
    doubler: D,
    permits: PermitPool,
    config: TransformConfig,
}

impl<D: Doubler> Transformer<D> {
    /// Build a transformer around an existing pool.
    ///
    /// `config.permits` is ignored in favour of the pool's own capacity.
    pub fn new(doubler: D, permits: PermitPool, config: TransformConfig) -> Self {
        Self {
            doubler,
            permits,
            config,
        }
    }

    /// Build a transformer with a fresh pool sized from `config`.
    pub fn from_config(doubler: D, config: TransformConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let permits = PermitPool::new(config.permits)?;
        Ok(Self::new(doubler, permits, config))
    }

    pub fn permits(&self) -> &PermitPool {
        &self.permits
    }

    pub fn doubler(&self) -> &D {
        &self.doubler
    }

    /// Double every element of `input`.
    pub fn transform(&self, input: &[i64]) -> TransformOutcome {
        if input.is_empty() {
            return TransformOutcome::default();
        }

        let workers = self.config.worker_count(input.len());
        tracing::debug!(
            elements = input.len(),
            workers,
            permits = self.permits.capacity(),
            "transform started"
        );

        let (jobs_tx, jobs_rx) = cb::unbounded::<usize>();
        for index in 0..input.len() {
            // The receiver is alive for the whole function.
            let _ = jobs_tx.send(index);
        }
        drop(jobs_tx);

        let (results_tx, results_rx) = cb::unbounded::<(usize, Result<i64, String>)>();

        thread::scope(|scope| {
            // The calling thread is always one of the workers, so a refused
            // spawn degrades throughput rather than stalling the batch.
            for worker in 1..workers {
                let jobs = jobs_rx.clone();
                let results = results_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("transform-worker-{}", worker))
                    .spawn_scoped(scope, move || self.drain(input, &jobs, &results));
                if let Err(e) = spawned {
                    tracing::warn!(worker, error = %e, "could not start transform worker");
                }
            }
            self.drain(input, &jobs_rx, &results_tx);
        });
        drop(results_tx);

        let mut slots: Vec<Option<Result<i64, String>>> = vec![None; input.len()];
        for (index, result) in results_rx.iter() {
            slots[index] = Some(result);
        }

        let mut outcome = TransformOutcome {
            values: Vec::with_capacity(input.len()),
            failures: Vec::new(),
        };
        for (index, slot) in slots.into_iter().enumerate() {
            let value = input[index];
            match slot {
                Some(Ok(doubled)) => outcome.values.push(doubled),
                Some(Err(detail)) => outcome.failures.push(TransformError {
                    index,
                    value,
                    detail,
                }),
                None => outcome.failures.push(TransformError {
                    index,
                    value,
                    detail: "no result was produced".to_string(),
                }),
            }
        }

        tracing::debug!(
            succeeded = outcome.values.len(),
            failed = outcome.failures.len(),
            "transform finished"
        );
        outcome
    }

    fn drain(
        &self,
        input: &[i64],
        jobs: &cb::Receiver<usize>,
        results: &cb::Sender<(usize, Result<i64, String>)>,
    ) {
        for index in jobs.iter() {
            let value = input[index];
            let result = self.call(value);
            if let Err(detail) = &result {
                tracing::warn!(index, value, %detail, "transform failed");
            }
            let _ = results.send((index, result));
        }
    }

    fn call(&self, value: i64) -> Result<i64, String> {
        let _permit = self.permits.acquire();
        match panic::catch_unwind(AssertUnwindSafe(|| self.doubler.double(value))) {
            Ok(Ok(doubled)) => Ok(doubled),
            Ok(Err(failure)) => Err(failure.to_string()),
            Err(payload) => Err(format!("doubler panicked: {}", panic_message(payload.as_ref()))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
