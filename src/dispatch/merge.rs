//! Result merger -- republishes every worker's outcomes on one stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::types::Outcome;

use super::worker::WorkerEvent;

/// Live stream of outcomes from one dispatch call.
///
/// Outcomes arrive in completion order across workers and in claim order within a
/// worker. The stream ends once every worker has finished, or as soon as the dispatch
/// is cancelled. Dropping it stops the workers at their next publish.
///
/// If a worker panics (for example inside a validator), polling the stream resumes
/// that panic on the polling task.
pub struct OutcomeStream {
    inner: BoxStream<'static, Outcome>,
}

impl OutcomeStream {
    /// Stream that yields nothing
    pub fn empty() -> Self {
        Self {
            inner: futures::stream::empty().boxed(),
        }
    }
}

impl Stream for OutcomeStream {
    type Item = Outcome;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl std::fmt::Debug for OutcomeStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeStream").finish_non_exhaustive()
    }
}

/// Combine the workers' shared channel into one [`OutcomeStream`].
///
/// With a `cancel` token, forwarding stops the moment it fires, without draining
/// outcomes still buffered in the channel.
pub(crate) fn merge(
    rx: mpsc::Receiver<WorkerEvent>,
    cancel: Option<CancellationToken>,
) -> OutcomeStream {
    let outcomes = ReceiverStream::new(rx).map(|event| match event {
        WorkerEvent::Outcome(outcome) => outcome,
        WorkerEvent::Panicked(payload) => std::panic::resume_unwind(payload),
    });

    let inner = match cancel {
        Some(token) => outcomes.take_until(token.cancelled_owned()).boxed(),
        None => outcomes.boxed(),
    };

    OutcomeStream { inner }
}
