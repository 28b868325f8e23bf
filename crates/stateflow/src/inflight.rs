//! Tracking of effect tasks that have been spawned but not yet finished.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Counts in-flight effect invocations.
///
/// Each spawned effect holds an [`InflightGuard`] until its follow-up action
/// (if any) has been dispatched. A follow-up that triggers further effects
/// registers them before the parent guard drops, so [`settled`] waits for
/// whole chains, not just the first hop.
///
/// [`settled`]: InflightTracker::settled
#[derive(Debug, Default)]
pub struct InflightTracker {
    count: AtomicUsize,
    idle: Notify,
}

impl InflightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(self: &Arc<Self>) -> InflightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InflightGuard {
            tracker: Arc::clone(self),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Resolve once nothing is in flight.
    pub async fn settled(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Decrements the tracker when dropped, including during unwinding.
#[derive(Debug)]
pub struct InflightGuard {
    tracker: Arc<InflightTracker>,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        if self.tracker.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn settled_returns_immediately_when_idle() {
        let tracker = Arc::new(InflightTracker::new());
        tokio::time::timeout(Duration::from_millis(100), tracker.settled())
            .await
            .expect("idle tracker settles");
    }

    #[tokio::test]
    async fn settled_waits_for_every_guard() {
        let tracker = Arc::new(InflightTracker::new());
        let first = tracker.begin();
        let second = tracker.begin();
        assert_eq!(tracker.in_flight(), 2);

        let waiter = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.settled().await })
        };

        drop(first);
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(second);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("settles after last guard")
            .unwrap();
        assert_eq!(tracker.in_flight(), 0);
    }
}
