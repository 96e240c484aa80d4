//! Fetch worker -- claims requests, issues them, validates, and publishes one outcome each.

use std::any::Any;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::transport::Transport;
use crate::types::{HttpResponse, Outcome};
use crate::validate::{Validator, run_validators};

use super::source::TaskSource;

/// Message a worker publishes on the shared outcome channel.
pub(crate) enum WorkerEvent {
    /// One processed request
    Outcome(Outcome),
    /// The worker panicked; the payload is re-raised on the consuming task
    Panicked(Box<dyn Any + Send>),
}

/// One member of the worker pool.
pub(crate) struct FetchWorker<R, T: ?Sized> {
    pub(crate) id: usize,
    pub(crate) source: Arc<TaskSource<R>>,
    pub(crate) transport: Arc<T>,
    pub(crate) validators: Arc<[Validator]>,
    pub(crate) cancel: CancellationToken,
    pub(crate) tx: mpsc::Sender<WorkerEvent>,
}

impl<R, T> FetchWorker<R, T>
where
    R: Send + 'static,
    T: Transport<R> + ?Sized,
{
    /// Process requests until the source is empty, cancellation fires, or nobody is
    /// listening anymore. Returns the number of outcomes published.
    ///
    /// A request whose transport call is interrupted by cancellation produces no outcome.
    pub(crate) async fn run(self) -> usize {
        let mut published = 0;

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!(
                    worker = self.id,
                    "Cancellation observed, not claiming more requests"
                );
                break;
            }
            let Some(request) = self.source.claim() else {
                break;
            };

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!(worker = self.id, "Cancelled with a request in flight");
                    break;
                }
                result = self.transport.issue(request) => result,
            };

            let outcome = evaluate(result, &self.validators);
            if let Outcome::Failure(e) = &outcome {
                tracing::debug!(worker = self.id, error = %e, "Request failed");
            }

            let delivered = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => false,
                sent = self.tx.send(WorkerEvent::Outcome(outcome)) => sent.is_ok(),
            };
            if !delivered {
                tracing::debug!(worker = self.id, "Outcome not delivered, stopping worker");
                break;
            }
            published += 1;
        }

        published
    }
}

/// Turn a transport result into an outcome by running the validator chain.
///
/// A rejected response is discarded; only the validator's error is kept.
pub(crate) fn evaluate(result: Result<HttpResponse>, validators: &[Validator]) -> Outcome {
    match result {
        Ok(response) => match run_validators(&response, validators) {
            Ok(()) => Outcome::Success(response),
            Err(e) => Outcome::Failure(e),
        },
        Err(e) => Outcome::Failure(e),
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
