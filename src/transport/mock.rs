//! Test double that answers every request without network I/O.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::HttpResponse;

use super::Transport;

type Handler<R> = dyn Fn(&R) -> Result<HttpResponse> + Send + Sync;

/// Transport stand-in returning canned results.
///
/// Records whether it was invoked, how many calls it served, and the highest number
/// of calls that were in flight at once.
///
/// # Example
///
/// ```
/// use multi_fetch::transport::{MockTransport, Transport};
///
/// # async fn example() -> multi_fetch::Result<()> {
/// let mock = MockTransport::<String>::fixed(200, "ok");
/// let response = mock.issue("https://example.com".to_string()).await?;
/// assert_eq!(response.status, 200);
/// assert!(mock.was_invoked());
/// # Ok(())
/// # }
/// ```
pub struct MockTransport<R> {
    handler: Box<Handler<R>>,
    delay: Option<Duration>,
    invoked: AtomicBool,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: AtomicUsize,
}

impl<R> MockTransport<R> {
    /// Answer every request with `status` and `body`
    pub fn fixed(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let response = HttpResponse::new(status).with_body(body);
        Self::from_fn(move |_| Ok(response.clone()))
    }

    /// Fail every request with a transport error carrying `message`
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_fn(move |_| Err(Error::Transport(message.clone())))
    }

    /// Compute the result for each request with `handler`
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(&R) -> Result<HttpResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            delay: None,
            invoked: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` before answering each request
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// True once any request has been issued
    pub fn was_invoked(&self) -> bool {
        self.invoked.load(Ordering::SeqCst)
    }

    /// Number of requests issued so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of requests currently being answered
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of requests answered concurrently
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl<R> Transport<R> for MockTransport<R>
where
    R: Send + 'static,
{
    async fn issue(&self, request: R) -> Result<HttpResponse> {
        self.invoked.store(true, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        // Decrements even if the call is aborted mid-delay
        let _guard = InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.handler)(&request)
    }
}

struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
