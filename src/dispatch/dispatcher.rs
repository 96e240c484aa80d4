//! Async dispatcher -- returns a live outcome stream, plus the drain that folds it.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::error::{AggregateError, Error, Result};
use crate::transport::Transport;
use crate::types::{HttpResponse, Outcome};
use crate::validate::Validator;

use super::merge::{OutcomeStream, merge};
use super::pool::WorkerPool;

/// Issues batches of requests with bounded parallelism and streams the outcomes back.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use multi_fetch::{Dispatcher, ReqwestTransport, drain, validate_status_ok};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> multi_fetch::Result<()> {
/// let dispatcher = Dispatcher::new(Arc::new(ReqwestTransport::new()), 4);
/// let cancel = CancellationToken::new();
///
/// let urls = vec![
///     "https://example.com/a".to_string(),
///     "https://example.com/b".to_string(),
/// ];
/// let outcomes = dispatcher.dispatch(&cancel, urls, &[validate_status_ok]);
///
/// drain(&cancel, outcomes, |response| {
///     println!("{} bytes", response.body.len());
///     Ok(())
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher<T: ?Sized> {
    pool: WorkerPool<T>,
}

impl<T: ?Sized> Dispatcher<T> {
    /// Create a dispatcher over `transport` (limit 0 = one worker per request)
    pub fn new(transport: Arc<T>, concurrency_limit: usize) -> Self {
        Self {
            pool: WorkerPool::new(transport, concurrency_limit),
        }
    }

    /// Create a dispatcher using the limit from [`DispatchConfig`]
    pub fn from_config(transport: Arc<T>, config: &DispatchConfig) -> Self {
        Self::new(transport, config.concurrency_limit)
    }

    /// Configured concurrency limit (0 = one worker per request)
    pub fn concurrency_limit(&self) -> usize {
        self.pool.concurrency_limit()
    }

    /// Start processing `requests` and return their outcomes as a stream.
    ///
    /// Returns immediately. Each response runs through `validators` in order; the first
    /// rejection turns it into a failed outcome. Once `cancel` fires, workers stop
    /// claiming requests and the stream ends.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime with a non-empty batch.
    pub fn dispatch<R>(
        &self,
        cancel: &CancellationToken,
        requests: Vec<R>,
        validators: &[Validator],
    ) -> OutcomeStream
    where
        R: Send + 'static,
        T: Transport<R> + 'static,
    {
        if requests.is_empty() {
            return OutcomeStream::empty();
        }
        tracing::info!(
            requests = requests.len(),
            validators = validators.len(),
            concurrency_limit = self.concurrency_limit(),
            "Dispatching requests"
        );
        let rx = self.pool.spawn(requests, validators, cancel);
        merge(rx, Some(cancel.clone()))
    }
}

/// Read `outcomes` to the end, calling `handler` with every successful response.
///
/// Failed outcomes and handler errors are collected in encounter order and returned as
/// [`Error::Aggregate`]. Cancellation is checked before each outcome; once `cancel`
/// fires this returns [`Error::Cancelled`] right away and abandons anything still
/// buffered.
pub async fn drain<F>(
    cancel: &CancellationToken,
    mut outcomes: OutcomeStream,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(HttpResponse) -> Result<()>,
{
    let mut errors = AggregateError::new();
    let mut succeeded = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(
                    succeeded,
                    failed = errors.len(),
                    "Drain cancelled before all outcomes arrived"
                );
                return Err(Error::Cancelled);
            }
            next = outcomes.next() => next,
        };
        let Some(outcome) = next else {
            break;
        };

        match outcome {
            Outcome::Success(response) => match handler(response) {
                Ok(()) => succeeded += 1,
                Err(e) => errors.push(e),
            },
            Outcome::Failure(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        tracing::warn!(
            succeeded,
            failed = errors.len(),
            "Dispatch finished with failures"
        );
    }
    errors.into_result().map_err(Error::Aggregate)
}
