//! Data access operations - list, add, delete
//!
//! `UrlService` is the only path through which records change, so it is
//! also where the change feed gets notified.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::Result;
use crate::live::{Change, ChangeFeed, LiveUrls};
use crate::record::{UrlId, UrlRecord};
use crate::storage::{DbStats, SqliteStore};

/// The three operations the view is bound to.
pub trait UrlOperations {
    /// Every record, most recent first
    fn list(&self) -> Result<Vec<UrlRecord>>;

    /// Store `url` as given and return the new record's id.
    /// Performs no validation.
    fn add(&self, url: &str) -> Result<UrlId>;

    /// Remove a record; fails with `Error::UrlNotFound` for unknown ids
    fn delete(&self, id: &UrlId) -> Result<()>;
}

/// Store + change feed.
#[derive(Clone)]
pub struct UrlService {
    store: Arc<SqliteStore>,
    feed: ChangeFeed,
}

impl UrlService {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Arc::new(store),
            feed: ChangeFeed::new(),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(SqliteStore::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(SqliteStore::open_in_memory()?))
    }

    /// Live variant of [`UrlOperations::list`]
    pub fn subscribe(&self) -> LiveUrls {
        LiveUrls::new(self.store.clone(), self.feed.subscribe())
    }

    /// Start announcing commits made by other processes sharing the file
    pub fn watch_external(&self, interval: Duration) -> JoinHandle<()> {
        self.feed.watch_external(self.store.clone(), interval)
    }

    pub fn stats(&self) -> Result<DbStats> {
        self.store.stats()
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

impl UrlOperations for UrlService {
    fn list(&self) -> Result<Vec<UrlRecord>> {
        self.store.list_urls()
    }

    fn add(&self, url: &str) -> Result<UrlId> {
        let record = self.store.insert_url(url)?;
        tracing::debug!(id = %record.id, url = %record.url, "Added URL");
        self.feed.notify(Change::Inserted(record.id));
        Ok(record.id)
    }

    fn delete(&self, id: &UrlId) -> Result<()> {
        self.store.delete_url(id)?;
        tracing::debug!(%id, "Deleted URL");
        self.feed.notify(Change::Deleted(*id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_add_appears_once_as_first() {
        let service = UrlService::open_in_memory().unwrap();
        service.add("https://other.com").unwrap();
        let id = service.add("https://example.com").unwrap();

        let urls = service.list().unwrap();
        assert_eq!(urls[0].id, id);
        assert_eq!(urls[0].url, "https://example.com");
        assert_eq!(urls.iter().filter(|r| r.url == "https://example.com").count(), 1);
    }

    #[test]
    fn test_duplicates_are_independent() {
        let service = UrlService::open_in_memory().unwrap();
        let first = service.add("https://example.com").unwrap();
        let second = service.add("https://example.com").unwrap();

        assert_ne!(first, second);
        assert_eq!(service.list().unwrap().len(), 2);
    }

    #[test]
    fn test_add_add_delete_scenario() {
        let service = UrlService::open_in_memory().unwrap();
        let a = service.add("https://a.com").unwrap();
        service.add("https://b.com").unwrap();

        let urls: Vec<_> = service.list().unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, ["https://b.com", "https://a.com"]);

        service.delete(&a).unwrap();
        let urls: Vec<_> = service.list().unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, ["https://b.com"]);

        let err = service.delete(&a).unwrap_err();
        assert!(matches!(err, Error::UrlNotFound(_)));
    }

    #[test]
    fn test_summary_never_set() {
        let service = UrlService::open_in_memory().unwrap();
        let a = service.add("https://a.com").unwrap();
        service.add("").unwrap();
        service.add("https://c.com").unwrap();
        service.delete(&a).unwrap();

        assert!(service.list().unwrap().iter().all(|r| r.summary.is_none()));
    }

    #[test]
    fn test_failed_delete_does_not_notify() {
        let service = UrlService::open_in_memory().unwrap();
        let mut changes = service.feed().subscribe();

        assert!(service.delete(&UrlId::generate()).is_err());
        assert!(changes.try_recv().is_err());

        let id = service.add("https://a.com").unwrap();
        assert_eq!(changes.try_recv().unwrap(), Change::Inserted(id));
    }

    #[tokio::test]
    async fn test_subscriber_follows_mutations() {
        let service = UrlService::open_in_memory().unwrap();
        let mut live = service.subscribe();

        assert!(live.next().await.unwrap().unwrap().is_empty());

        let id = service.add("https://a.com").unwrap();
        let snapshot = live.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);

        service.delete(&id).unwrap();
        assert!(live.next().await.unwrap().unwrap().is_empty());
    }
}
