//! Read-only broadcast of the latest state.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::watch;

/// Observable view of a store's current state.
///
/// Every receiver sees the newest value; intermediate states may be skipped
/// by a slow reader. Use [`Store::subscribe`](crate::Store::subscribe) when
/// every transition must be observed.
#[derive(Debug, Clone)]
pub struct StateStream<S> {
    rx: watch::Receiver<Arc<S>>,
}

impl<S> StateStream<S>
where
    S: Send + Sync + 'static,
{
    pub(crate) fn new(rx: watch::Receiver<Arc<S>>) -> Self {
        Self { rx }
    }

    /// Latest published state. Does not mark it as seen.
    pub fn current(&self) -> Arc<S> {
        Arc::clone(&self.rx.borrow())
    }

    /// Wait for a state newer than the last one seen through this stream.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<Arc<S>> {
        self.rx.changed().await.ok()?;
        Some(Arc::clone(&self.rx.borrow_and_update()))
    }

    /// Current state first, then every subsequent change.
    pub fn into_stream(mut self) -> BoxStream<'static, Arc<S>> {
        let first = Arc::clone(&self.rx.borrow_and_update());
        let rest = stream::unfold(self, |mut this| async move {
            let next = this.changed().await?;
            Some((next, this))
        });
        stream::once(async move { first }).chain(rest).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn changed_yields_latest_value() {
        let (tx, rx) = watch::channel(Arc::new(0u32));
        let mut stream = StateStream::new(rx);

        tx.send_replace(Arc::new(1));
        tx.send_replace(Arc::new(2));

        assert_eq!(*stream.changed().await.unwrap(), 2);
        assert_eq!(*stream.current(), 2);
    }

    #[tokio::test]
    async fn changed_ends_when_sender_drops() {
        let (tx, rx) = watch::channel(Arc::new(0u32));
        let mut stream = StateStream::new(rx);
        drop(tx);
        assert!(stream.changed().await.is_none());
    }

    #[tokio::test]
    async fn into_stream_starts_with_current() {
        let (tx, rx) = watch::channel(Arc::new("a"));
        let mut stream = StateStream::new(rx).into_stream();

        assert_eq!(*stream.next().await.unwrap(), "a");
        tx.send_replace(Arc::new("b"));
        assert_eq!(*stream.next().await.unwrap(), "b");
        drop(tx);
        assert!(stream.next().await.is_none());
    }
}
