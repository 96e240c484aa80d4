//! Worker pool -- fans a request batch out to a bounded set of fetch workers.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::transport::Transport;
use crate::validate::Validator;

use super::source::TaskSource;
use super::worker::{FetchWorker, WorkerEvent, panic_message};

/// Number of workers for `total` requests under `limit` (0 = one worker per request).
pub(crate) fn worker_count(limit: usize, total: usize) -> usize {
    if limit == 0 {
        total
    } else {
        limit.min(total)
    }
}

/// Spawns fetch workers that share one [`TaskSource`] and one outcome channel.
pub(crate) struct WorkerPool<T: ?Sized> {
    transport: Arc<T>,
    concurrency_limit: usize,
}

impl<T: ?Sized> WorkerPool<T> {
    pub(crate) fn new(transport: Arc<T>, concurrency_limit: usize) -> Self {
        Self {
            transport,
            concurrency_limit,
        }
    }

    pub(crate) fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Spawn the workers for `requests` and return the receiving end of their shared
    /// outcome channel.
    ///
    /// The channel holds at most one pending outcome per worker and closes once every
    /// worker has exited. Must be called from within a Tokio runtime.
    pub(crate) fn spawn<R>(
        &self,
        requests: Vec<R>,
        validators: &[Validator],
        cancel: &CancellationToken,
    ) -> mpsc::Receiver<WorkerEvent>
    where
        R: Send + 'static,
        T: Transport<R> + 'static,
    {
        let total = requests.len();
        let workers = worker_count(self.concurrency_limit, total);
        let (tx, rx) = mpsc::channel(workers.max(1));

        let source = Arc::new(TaskSource::new(requests));
        let validators: Arc<[Validator]> = Arc::from(validators);

        tracing::debug!(
            requests = total,
            workers = workers,
            concurrency_limit = self.concurrency_limit,
            "Spawning fetch workers"
        );

        for id in 0..workers {
            let worker = FetchWorker {
                id,
                source: Arc::clone(&source),
                transport: Arc::clone(&self.transport),
                validators: Arc::clone(&validators),
                cancel: cancel.clone(),
                tx: tx.clone(),
            };
            let panic_tx = tx.clone();
            let panic_cancel = cancel.clone();

            tokio::spawn(async move {
                match std::panic::AssertUnwindSafe(worker.run())
                    .catch_unwind()
                    .await
                {
                    Ok(published) => {
                        tracing::trace!(worker = id, published, "Fetch worker finished");
                    }
                    Err(payload) => {
                        tracing::error!(
                            worker = id,
                            panic = %panic_message(payload.as_ref()),
                            "Fetch worker panicked"
                        );
                        // Hand the panic to whoever consumes the outcomes
                        tokio::select! {
                            _ = panic_cancel.cancelled() => {}
                            _ = panic_tx.send(WorkerEvent::Panicked(payload)) => {}
                        }
                    }
                }
            });
        }

        rx
    }
}
