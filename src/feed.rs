//! Change feed and live query subscriptions.
//!
//! Writers publish a [`StoreChange`] after each successful commit. A
//! [`Subscription`] turns those events into a sequence of freshly queried
//! snapshots: the first item is the current state, and every change to one of
//! its watched tables produces another. Dropping a subscription unsubscribes it;
//! in-flight writes are unaffected.

use crate::errors::Result;
use futures::{Stream, future::BoxFuture, stream};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Tables a change can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// The `users` table
    Users,
    /// The `budgets` table
    Budgets,
    /// The `expenses` table
    Expenses,
}

/// What happened to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A new row
    Inserted,
    /// An existing row changed
    Updated,
    /// The row was removed
    Deleted,
}

/// One committed row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    /// Table the row lives in
    pub table: Table,
    /// What happened to the row
    pub kind: ChangeKind,
    /// Primary key of the changed row
    pub id: i64,
}

impl StoreChange {
    /// Describes one committed change.
    #[must_use]
    pub const fn new(table: Table, kind: ChangeKind, id: i64) -> Self {
        Self { table, kind, id }
    }
}

/// Broadcast bus fanning committed changes out to every subscription.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<StoreChange>,
}

impl ChangeFeed {
    /// Creates a feed buffering up to `capacity` events per receiver.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Raw event receiver.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }

    /// Publishes a change. Having no listeners is not an error.
    pub fn publish(&self, change: StoreChange) {
        debug!(?change, "Publishing store change");
        let _ = self.sender.send(change);
    }

    /// Number of live receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Re-runs the query behind a subscription.
pub type SnapshotQuery<T> = Box<dyn Fn() -> BoxFuture<'static, Result<Vec<T>>> + Send + Sync>;

/// A live query: a sequence of immutable snapshots, one per relevant change.
pub struct Subscription<T> {
    receiver: broadcast::Receiver<StoreChange>,
    watched: &'static [Table],
    query: SnapshotQuery<T>,
    primed: bool,
}

impl<T> Subscription<T>
where
    T: Send + 'static,
{
    /// Builds a subscription over an existing receiver.
    ///
    /// The receiver must be taken before the initial snapshot is queried so
    /// that no change committed in between is missed.
    pub fn new(
        receiver: broadcast::Receiver<StoreChange>,
        watched: &'static [Table],
        query: SnapshotQuery<T>,
    ) -> Self {
        Self {
            receiver,
            watched,
            query,
            primed: false,
        }
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the feed has been dropped. A receiver that fell
    /// behind re-queries immediately instead of replaying the missed events.
    pub async fn next(&mut self) -> Option<Result<Vec<T>>> {
        if !self.primed {
            self.primed = true;
            return Some((self.query)().await);
        }

        loop {
            match self.receiver.recv().await {
                Ok(change) if self.watched.contains(&change.table) => {
                    return Some((self.query)().await);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscription lagged, refreshing snapshot");
                    return Some((self.query)().await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Exposes the subscription as a [`Stream`] of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>>> + Send {
        stream::unfold(self, |mut subscription| async move {
            subscription
                .next()
                .await
                .map(|snapshot| (snapshot, subscription))
        })
    }

    /// Stops receiving changes.
    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use futures::{FutureExt, StreamExt};
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn counting_query(counter: Arc<AtomicUsize>) -> SnapshotQuery<usize> {
        Box::new(move || {
            let counter = Arc::clone(&counter);
            async move { Ok(vec![counter.fetch_add(1, Ordering::SeqCst)]) }.boxed()
        })
    }

    #[tokio::test]
    async fn test_first_item_is_current_snapshot() {
        let feed = ChangeFeed::new(8);
        let counter = Arc::new(AtomicUsize::new(0));
        let mut sub = Subscription::new(
            feed.subscribe(),
            &[Table::Budgets],
            counting_query(Arc::clone(&counter)),
        );

        assert_eq!(sub.next().await.unwrap().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_only_watched_tables_trigger_refresh() {
        let feed = ChangeFeed::new(8);
        let counter = Arc::new(AtomicUsize::new(0));
        let mut sub = Subscription::new(
            feed.subscribe(),
            &[Table::Expenses],
            counting_query(Arc::clone(&counter)),
        );
        sub.next().await.unwrap().unwrap();

        feed.publish(StoreChange::new(Table::Users, ChangeKind::Inserted, 1));
        feed.publish(StoreChange::new(Table::Expenses, ChangeKind::Deleted, 4));

        // The user change is skipped; one refresh for the expense change
        assert_eq!(sub.next().await.unwrap().unwrap(), vec![1]);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lagged_subscription_refreshes() {
        let feed = ChangeFeed::new(1);
        let counter = Arc::new(AtomicUsize::new(0));
        let mut sub = Subscription::new(
            feed.subscribe(),
            &[Table::Budgets],
            counting_query(Arc::clone(&counter)),
        );
        sub.next().await.unwrap().unwrap();

        for id in 0..5 {
            feed.publish(StoreChange::new(Table::Budgets, ChangeKind::Updated, id));
        }

        assert!(sub.next().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_closed_feed_ends_stream() {
        let feed = ChangeFeed::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new(
            feed.subscribe(),
            &[Table::Budgets],
            counting_query(Arc::clone(&counter)),
        );

        feed.publish(StoreChange::new(Table::Budgets, ChangeKind::Inserted, 1));
        drop(feed);

        let snapshots: Vec<_> = sub.into_stream().collect().await;
        // Initial snapshot, one buffered change, then the end of the stream
        assert_eq!(snapshots.len(), 2);
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_receiver() {
        let feed = ChangeFeed::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new(feed.subscribe(), &[Table::Budgets], counting_query(counter));
        assert_eq!(feed.receiver_count(), 1);

        sub.unsubscribe();
        assert_eq!(feed.receiver_count(), 0);
    }
}
