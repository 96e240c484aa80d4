//! Batch collector -- runs every request to completion and returns all results at once.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::error::{AggregateError, Result};
use crate::transport::Transport;
use crate::types::{HttpResponse, Outcome};
use crate::validate::Validator;

use super::merge::merge;
use super::pool::WorkerPool;

/// Successful responses in arrival order, plus every failure folded into one error.
pub type Collected = (Vec<HttpResponse>, std::result::Result<(), AggregateError>);

/// Fetches a whole batch and returns only once every request has an outcome.
///
/// Unlike [`Dispatcher`](super::Dispatcher) there is no cancellation input: all
/// requests are always issued, however many fail.
pub struct Collector<T: ?Sized> {
    pool: WorkerPool<T>,
}

impl<T: ?Sized> Collector<T> {
    /// Create a collector over `transport` (limit 0 = one worker per request)
    pub fn new(transport: Arc<T>, concurrency_limit: usize) -> Self {
        Self {
            pool: WorkerPool::new(transport, concurrency_limit),
        }
    }

    /// Create a collector using the limit from [`DispatchConfig`]
    pub fn from_config(transport: Arc<T>, config: &DispatchConfig) -> Self {
        Self::new(transport, config.concurrency_limit)
    }

    /// Configured concurrency limit (0 = one worker per request)
    pub fn concurrency_limit(&self) -> usize {
        self.pool.concurrency_limit()
    }

    /// Fetch every request and wait for all of them.
    ///
    /// Successful responses come back in the order their outcomes arrived, which is not
    /// necessarily input order. A failure never hides the successes gathered alongside it.
    pub async fn fetch_all<R>(&self, requests: Vec<R>, validators: &[Validator]) -> Collected
    where
        R: Send + 'static,
        T: Transport<R> + 'static,
    {
        let total = requests.len();
        let mut responses = Vec::with_capacity(total);
        let mut errors = AggregateError::new();
        if total == 0 {
            return (responses, Ok(()));
        }

        // Never cancelled: the collector always runs to completion
        let never = CancellationToken::new();
        let mut outcomes = merge(self.pool.spawn(requests, validators, &never), None);

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Outcome::Success(response) => responses.push(response),
                Outcome::Failure(e) => errors.push(e),
            }
        }

        tracing::info!(
            requests = total,
            succeeded = responses.len(),
            failed = errors.len(),
            "Collected batch"
        );
        (responses, errors.into_result())
    }

    /// Blocking form of [`fetch_all`](Self::fetch_all) for callers outside async code.
    ///
    /// Drives the batch on a private current-thread runtime. Fails only if that runtime
    /// cannot be created; request failures are reported inside [`Collected`].
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn fetch_all_blocking<R>(
        &self,
        requests: Vec<R>,
        validators: &[Validator],
    ) -> Result<Collected>
    where
        R: Send + 'static,
        T: Transport<R> + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.fetch_all(requests, validators)))
    }
}
