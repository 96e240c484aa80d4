//! Shared task source -- hands each request to exactly one worker.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Finite queue of requests drained concurrently by fetch workers.
///
/// Each call to [`claim`](TaskSource::claim) removes one request under a short lock,
/// so no request is delivered twice and none is dropped.
#[derive(Debug)]
pub struct TaskSource<R> {
    pending: Mutex<VecDeque<R>>,
    total: usize,
    claimed: AtomicUsize,
}

impl<R> TaskSource<R> {
    /// Create a source yielding `requests` in order
    pub fn new(requests: impl IntoIterator<Item = R>) -> Self {
        let pending: VecDeque<R> = requests.into_iter().collect();
        Self {
            total: pending.len(),
            pending: Mutex::new(pending),
            claimed: AtomicUsize::new(0),
        }
    }

    /// Take the next request, or `None` once every request has been handed out
    pub fn claim(&self) -> Option<R> {
        let next = match self.pending.lock() {
            Ok(mut pending) => pending.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        if next.is_some() {
            self.claimed.fetch_add(1, Ordering::SeqCst);
        }
        next
    }

    /// Number of requests the source was created with
    pub fn len(&self) -> usize {
        self.total
    }

    /// True if the source was created empty
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of requests handed out so far
    pub fn claimed(&self) -> usize {
        self.claimed.load(Ordering::SeqCst)
    }

    /// Number of requests still waiting for a worker
    pub fn remaining(&self) -> usize {
        self.total - self.claimed()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn yields_each_request_once_then_none() {
        let source = TaskSource::new(vec!["a", "b", "c"]);

        assert_eq!(source.len(), 3);
        assert_eq!(source.claim(), Some("a"));
        assert_eq!(source.claim(), Some("b"));
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.claim(), Some("c"));
        assert_eq!(source.claim(), None);
        assert_eq!(source.claim(), None);
        assert_eq!(source.claimed(), 3);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn empty_source_is_exhausted_immediately() {
        let source = TaskSource::<String>::new(Vec::new());

        assert!(source.is_empty());
        assert_eq!(source.claim(), None);
        assert_eq!(source.claimed(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_claims_never_duplicate_or_drop() {
        const TOTAL: usize = 1_000;
        let source = Arc::new(TaskSource::new(0..TOTAL));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let source = Arc::clone(&source);
                tokio::spawn(async move {
                    let mut taken = Vec::new();
                    while let Some(n) = source.claim() {
                        taken.push(n);
                        if n % 16 == 0 {
                            tokio::task::yield_now().await;
                        }
                    }
                    taken
                })
            })
            .collect();

        let mut seen = HashSet::new();
        let mut count = 0;
        for handle in handles {
            for n in handle.await.unwrap() {
                assert!(seen.insert(n), "request {n} delivered twice");
                count += 1;
            }
        }

        assert_eq!(count, TOTAL);
        assert_eq!(source.claimed(), TOTAL);
    }
}
