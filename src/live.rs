//! Change feed and live queries
//!
//! Every committed mutation is announced on a broadcast channel. A live
//! query re-runs the list operation for each announcement, so subscribers
//! always converge on the latest committed state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::Result;
use crate::record::{UrlId, UrlRecord};
use crate::storage::SqliteStore;

/// Channel capacity for change notifications.
/// A lagged subscriber re-queries, so overflow never loses the latest state.
const CHANNEL_CAPACITY: usize = 64;

/// A committed change to the url table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Inserted(UrlId),
    Deleted(UrlId),
    /// A commit made through another connection (e.g. a second process)
    External,
}

/// Multi-subscriber "notify on commit" channel.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<Change>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Announce a change to all subscribers.
    ///
    /// With no subscribers the change is dropped.
    pub fn notify(&self, change: Change) {
        tracing::debug!(?change, subscribers = self.sender.receiver_count(), "Change committed");
        let _ = self.sender.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.sender.subscribe()
    }

    /// Poll the store's `data_version` and announce commits made by other
    /// connections. Runs until the returned task is aborted.
    pub fn watch_external(&self, store: Arc<SqliteStore>, interval: Duration) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            let mut last = match store.data_version() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Failed to read data_version: {}", e);
                    None
                }
            };

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match store.data_version() {
                    Ok(v) if last != Some(v) => {
                        if last.is_some() {
                            feed.notify(Change::External);
                        }
                        last = Some(v);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to poll data_version: {}", e),
                }
            }
        })
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// A live list query.
///
/// The first call to [`LiveUrls::next`] yields the current list; each later
/// call waits for a change and yields the re-evaluated list. Changes that
/// pile up while the consumer is busy collapse into one re-evaluation.
pub struct LiveUrls {
    store: Arc<SqliteStore>,
    changes: broadcast::Receiver<Change>,
    primed: bool,
}

impl LiveUrls {
    pub(crate) fn new(store: Arc<SqliteStore>, changes: broadcast::Receiver<Change>) -> Self {
        Self {
            store,
            changes,
            primed: false,
        }
    }

    /// Next snapshot of the list, or `None` once the feed is gone.
    pub async fn next(&mut self) -> Option<Result<Vec<UrlRecord>>> {
        if !self.primed {
            self.primed = true;
            return Some(self.store.list_urls());
        }

        match self.changes.recv().await {
            Ok(_) => {}
            Err(RecvError::Lagged(count)) => {
                tracing::debug!(count, "Live query lagged, re-evaluating");
            }
            Err(RecvError::Closed) => return None,
        }

        loop {
            match self.changes.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        Some(self.store.list_urls())
    }

    /// Turn the live query into a stream of snapshots
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<Vec<UrlRecord>>> + Send {
        futures::stream::unfold(self, |mut live| async move {
            live.next().await.map(|snapshot| (snapshot, live))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_snapshot_is_current_list() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.insert_url("https://a.com").unwrap();

        let feed = ChangeFeed::new();
        let mut live = LiveUrls::new(store.clone(), feed.subscribe());

        let first = live.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].url, "https://a.com");
    }

    #[tokio::test]
    async fn test_notifications_coalesce() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let feed = ChangeFeed::new();
        let mut live = LiveUrls::new(store.clone(), feed.subscribe());
        live.next().await.unwrap().unwrap();

        for url in ["https://a.com", "https://b.com", "https://c.com"] {
            let record = store.insert_url(url).unwrap();
            feed.notify(Change::Inserted(record.id));
        }

        let snapshot = live.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 3);

        // All three notifications were consumed by the single re-evaluation
        let pending = tokio::time::timeout(Duration::from_millis(50), live.next()).await;
        assert!(pending.is_err());
    }

    #[tokio::test]
    async fn test_closed_feed_ends_query() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let feed = ChangeFeed::new();
        let mut live = LiveUrls::new(store, feed.subscribe());
        live.next().await.unwrap().unwrap();

        drop(feed);
        assert!(live.next().await.is_none());
    }

    #[tokio::test]
    async fn test_external_commit_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.db");
        let store = Arc::new(SqliteStore::open(&path).unwrap());
        let other = SqliteStore::open(&path).unwrap();

        let feed = ChangeFeed::new();
        let mut changes = feed.subscribe();
        let poller = feed.watch_external(store.clone(), Duration::from_millis(10));

        // Let the poller record its baseline
        tokio::time::sleep(Duration::from_millis(50)).await;
        other.insert_url("https://elsewhere.com").unwrap();

        let change = tokio::time::timeout(Duration::from_secs(2), changes.recv())
            .await
            .expect("external change not observed")
            .unwrap();
        assert_eq!(change, Change::External);

        poller.abort();
    }
}
