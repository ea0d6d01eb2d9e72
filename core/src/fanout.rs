//! Concurrent fan-out of independent requests with join-all collection.
//!
//! # Design
//! Workers are scoped threads, so they borrow the executor and descriptors
//! directly and `run` cannot return before every one of them has finished.
//! The `ResultSet` behind a mutex is the only state they share mutably.
//!
//! By default there is one thread per descriptor with no upper bound, which
//! suits the small batches this harness issues. `with_max_workers` caps the
//! thread count; capped workers pull descriptors from a shared cursor.
//!
//! Entry order in the `ResultSet` is completion order and therefore not
//! stable between runs. Inspect it with membership predicates only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use crate::descriptor::RequestDescriptor;
use crate::error::{HarnessError, Result};
use crate::executor::RequestExecutor;
use crate::http::HttpMethod;
use crate::response::Response;

/// A descriptor whose request failed at the transport or config level.
#[derive(Debug)]
pub struct WorkerFailure {
    pub method: HttpMethod,
    pub path: String,
    pub error: HarnessError,
}

/// Append-only outcome of a fan-out.
#[derive(Debug, Default)]
pub struct ResultSet {
    responses: Vec<Response>,
    failures: Vec<WorkerFailure>,
}

impl ResultSet {
    fn record(&mut self, descriptor: &RequestDescriptor, outcome: Result<Response>) {
        match outcome {
            Ok(response) => self.responses.push(response),
            Err(error) => self.failures.push(WorkerFailure {
                method: descriptor.method,
                path: descriptor.path.clone(),
                error,
            }),
        }
    }

    /// Number of responses received. Failed workers are not counted.
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn failures(&self) -> &[WorkerFailure] {
        &self.failures
    }

    /// True when every descriptor produced a response.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every received response has `status`. Vacuously true when empty.
    pub fn all_status(&self, status: u16) -> bool {
        self.responses.iter().all(|r| r.status() == status)
    }

    pub fn count_status(&self, status: u16) -> usize {
        self.responses.iter().filter(|r| r.status() == status).count()
    }

    pub fn into_responses(self) -> Vec<Response> {
        self.responses
    }
}

/// Runs a batch of descriptors through one executor in parallel.
pub struct FanOut<'a> {
    executor: &'a RequestExecutor,
    max_workers: Option<usize>,
}

impl<'a> FanOut<'a> {
    /// Worker limit defaults to the executor's configured `max_workers`.
    pub fn new(executor: &'a RequestExecutor) -> Self {
        Self {
            executor,
            max_workers: executor.config().max_workers.map(|n| n.max(1)),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers.max(1));
        self
    }

    /// Execute every descriptor and block until all of them are done.
    pub fn run(&self, descriptors: &[RequestDescriptor]) -> ResultSet {
        let results = Mutex::new(ResultSet::default());
        let cursor = AtomicUsize::new(0);

        let workers = match self.max_workers {
            Some(limit) => limit.min(descriptors.len()),
            None => descriptors.len(),
        };
        tracing::debug!(requests = descriptors.len(), workers, "starting fan-out");

        thread::scope(|scope| {
            let results = &results;
            let cursor = &cursor;

            if workers == descriptors.len() {
                for descriptor in descriptors {
                    scope.spawn(move || self.work(descriptor, results));
                }
            } else {
                for _ in 0..workers {
                    scope.spawn(move || {
                        while let Some(descriptor) = descriptors.get(cursor.fetch_add(1, Ordering::Relaxed)) {
                            self.work(descriptor, results);
                        }
                    });
                }
            }
        });

        let results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(
            responses = results.len(),
            failures = results.failures().len(),
            "fan-out finished"
        );
        results
    }

    fn work(&self, descriptor: &RequestDescriptor, results: &Mutex<ResultSet>) {
        let outcome = self.executor.execute(descriptor);
        if let Err(e) = &outcome {
            tracing::warn!(
                method = %descriptor.method,
                path = %descriptor.path,
                error = %e,
                "fan-out worker failed"
            );
        }
        results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(descriptor, outcome);
    }
}

/// One worker per descriptor, join-all. Shorthand for `FanOut::new(..).run(..)`.
pub fn fan_out(executor: &RequestExecutor, descriptors: &[RequestDescriptor]) -> ResultSet {
    FanOut::new(executor).run(descriptors)
}
