//! Query cache storage.
//!
//! Each key owns one entry moving through `Absent -> Loading -> Fresh ->
//! Stale -> Loading -> ...`. At most one fetch per key is in flight; every
//! caller asking for the key while it runs awaits that same fetch.

use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::{debug, warn};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;

use super::config::CacheConfig;
use super::keys::QueryKey;
use super::lock::mutex_lock;
use crate::services::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Absent,
    Loading,
    Fresh,
    Stale,
}

#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("query failed: {0}")]
    Failed(Arc<GatewayError>),
    #[error("fetch aborted: {0}")]
    Aborted(String),
    #[error("cached value for {0} has an unexpected shape")]
    Unexpected(String),
}

impl QueryError {
    /// The gateway failure behind this error, if there was one.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            QueryError::Failed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GatewayError> for QueryError {
    fn from(err: GatewayError) -> Self {
        QueryError::Failed(Arc::new(err))
    }
}

pub type FetchFuture<V> = BoxFuture<'static, Result<V, GatewayError>>;

/// Produces a fresh gateway call for a key; kept on the entry so that
/// invalidation can refetch for observers.
pub type Fetcher<V> = Arc<dyn Fn() -> FetchFuture<V> + Send + Sync>;

type SharedFetch<V> = Shared<BoxFuture<'static, Result<Arc<V>, QueryError>>>;

struct Entry<V> {
    status: QueryStatus,
    data: Option<Arc<V>>,
    fetched_at: Option<Instant>,
    in_flight: Option<SharedFetch<V>>,
    invalidated_while_loading: bool,
    fetcher: Option<Fetcher<V>>,
    observers: usize,
    status_tx: watch::Sender<QueryStatus>,
}

impl<V> Entry<V> {
    fn new() -> Self {
        let (status_tx, _) = watch::channel(QueryStatus::Absent);
        Self {
            status: QueryStatus::Absent,
            data: None,
            fetched_at: None,
            in_flight: None,
            invalidated_while_loading: false,
            fetcher: None,
            observers: 0,
            status_tx,
        }
    }

    fn set_status(&mut self, status: QueryStatus) {
        self.status = status;
        self.status_tx.send_replace(status);
    }

    fn is_fresh(&self, stale_after: Option<Duration>) -> bool {
        if self.status != QueryStatus::Fresh {
            return false;
        }
        match (stale_after, self.fetched_at) {
            (Some(limit), Some(at)) => at.elapsed() < limit,
            _ => true,
        }
    }

    fn effective_status(&self, stale_after: Option<Duration>) -> QueryStatus {
        if self.status == QueryStatus::Fresh && !self.is_fresh(stale_after) {
            QueryStatus::Stale
        } else {
            self.status
        }
    }
}

struct Inner<V> {
    entries: Mutex<HashMap<QueryKey, Entry<V>>>,
    config: CacheConfig,
}

impl<V: Send + Sync + 'static> Inner<V> {
    /// Starts a fetch for `key` on the runtime and records it as in flight.
    fn begin(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry<V>, fetcher: Fetcher<V>) -> SharedFetch<V> {
        let Ok(handle) = Handle::try_current() else {
            warn!("no async runtime, cannot fetch {key}");
            return futures::future::ready(Err(QueryError::Aborted("no async runtime".into())))
                .boxed()
                .shared();
        };

        let call = fetcher();
        let inner = Arc::clone(self);
        let task_key = key.clone();
        let task = handle.spawn(async move {
            let result = match AssertUnwindSafe(call).catch_unwind().await {
                Ok(result) => result.map_err(QueryError::from),
                Err(_) => Err(QueryError::Aborted(format!("fetch for {task_key} panicked"))),
            };
            inner.settle(&task_key, result)
        });

        let shared = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(QueryError::Aborted(e.to_string())),
            }
        }
        .boxed()
        .shared();

        entry.in_flight = Some(shared.clone());
        entry.invalidated_while_loading = false;
        entry.set_status(QueryStatus::Loading);
        debug!("{key} loading");
        shared
    }

    fn settle(self: &Arc<Self>, key: &QueryKey, result: Result<V, QueryError>) -> Result<Arc<V>, QueryError> {
        let mut entries = mutex_lock(&self.entries, "settle");
        let Some(entry) = entries.get_mut(key) else {
            return result.map(Arc::new);
        };
        entry.in_flight = None;
        let invalidated = std::mem::take(&mut entry.invalidated_while_loading);

        match result {
            Ok(value) => {
                let value = Arc::new(value);
                entry.data = Some(Arc::clone(&value));
                entry.fetched_at = Some(Instant::now());
                if invalidated {
                    entry.set_status(QueryStatus::Stale);
                    debug!("{key} settled stale");
                    if entry.observers > 0 {
                        if let Some(fetcher) = entry.fetcher.clone() {
                            self.begin(key, entry, fetcher);
                        }
                    }
                } else {
                    entry.set_status(QueryStatus::Fresh);
                    debug!("{key} fresh");
                }
                Ok(value)
            }
            Err(err) => {
                debug!("{key} failed: {err}");
                if entry.observers == 0 {
                    entries.remove(key);
                } else {
                    entry.data = None;
                    entry.fetched_at = None;
                    entry.set_status(QueryStatus::Absent);
                }
                Err(err)
            }
        }
    }
}

/// Shared, clonable handle to the query cache.
pub struct QueryCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = mutex_lock(&self.inner.entries, "debug");
        f.debug_struct("QueryCache")
            .field("entries", &entries.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl<V: Send + Sync + 'static> QueryCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        let entries = mutex_lock(&self.inner.entries, "status");
        entries
            .get(key)
            .map(|entry| entry.effective_status(self.inner.config.stale_after))
            .unwrap_or(QueryStatus::Absent)
    }

    /// Last stored result, fresh or not.
    pub fn peek(&self, key: &QueryKey) -> Option<Arc<V>> {
        let entries = mutex_lock(&self.inner.entries, "peek");
        entries.get(key).and_then(|entry| entry.data.clone())
    }

    /// Number of keys the cache currently tracks.
    pub fn len(&self) -> usize {
        mutex_lock(&self.inner.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn observers(&self, key: &QueryKey) -> usize {
        let entries = mutex_lock(&self.inner.entries, "observers");
        entries.get(key).map(|entry| entry.observers).unwrap_or(0)
    }

    /// Returns the fresh value for `key`, joining the in-flight fetch or
    /// starting one when there is none.
    pub async fn fetch(&self, key: QueryKey, fetcher: Fetcher<V>) -> Result<Arc<V>, QueryError> {
        let pending = {
            let mut entries = mutex_lock(&self.inner.entries, "fetch");
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.fetcher = Some(Arc::clone(&fetcher));

            if let Some(in_flight) = entry.in_flight.clone() {
                in_flight
            } else {
                let stale_after = self.inner.config.stale_after;
                match entry.data.clone().filter(|_| entry.is_fresh(stale_after)) {
                    Some(data) => return Ok(data),
                    None => self.inner.begin(&key, entry, fetcher),
                }
            }
        };
        pending.await
    }

    /// Like [`fetch`](Self::fetch) but ignores freshness. Still joins a fetch
    /// already in flight.
    pub async fn refetch(&self, key: QueryKey, fetcher: Fetcher<V>) -> Result<Arc<V>, QueryError> {
        let pending = {
            let mut entries = mutex_lock(&self.inner.entries, "refetch");
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            match &entry.in_flight {
                Some(in_flight) => in_flight.clone(),
                None => self.inner.begin(&key, entry, fetcher),
            }
        };
        pending.await
    }

    /// Registers a live reader of `key`. The entry is fetched now unless it
    /// is fresh or already loading, and refetched whenever it is invalidated
    /// while the subscription is alive.
    pub fn subscribe(&self, key: QueryKey, fetcher: Fetcher<V>) -> Subscription<V> {
        let mut entries = mutex_lock(&self.inner.entries, "subscribe");
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.fetcher = Some(Arc::clone(&fetcher));
        entry.observers += 1;
        let status = entry.status_tx.subscribe();

        if entry.in_flight.is_none() && !entry.is_fresh(self.inner.config.stale_after) {
            self.inner.begin(&key, entry, fetcher);
        }

        Subscription {
            inner: Arc::clone(&self.inner),
            key,
            status,
        }
    }

    /// Marks every entry matching one of `targets` stale and refetches the
    /// observed ones in the background. Returns how many entries were marked.
    pub fn invalidate(&self, targets: &[QueryKey]) -> usize {
        let mut entries = mutex_lock(&self.inner.entries, "invalidate");
        let mut marked = 0;

        for (key, entry) in entries.iter_mut() {
            if !targets.iter().any(|target| key.matches(target)) {
                continue;
            }
            match entry.status {
                QueryStatus::Absent => continue,
                QueryStatus::Loading => entry.invalidated_while_loading = true,
                QueryStatus::Fresh | QueryStatus::Stale => {
                    entry.set_status(QueryStatus::Stale);
                    if entry.observers > 0 {
                        if let Some(fetcher) = entry.fetcher.clone() {
                            self.inner.begin(key, entry, fetcher);
                        }
                    }
                }
            }
            debug!("{key} invalidated");
            marked += 1;
        }
        marked
    }
}

/// A live reader of one key. Dropping it unregisters the reader.
pub struct Subscription<V> {
    inner: Arc<Inner<V>>,
    key: QueryKey,
    status: watch::Receiver<QueryStatus>,
}

impl<V> Subscription<V> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn status(&self) -> QueryStatus {
        *self.status.borrow()
    }

    pub fn data(&self) -> Option<Arc<V>> {
        let entries = mutex_lock(&self.inner.entries, "subscription.data");
        entries.get(&self.key).and_then(|entry| entry.data.clone())
    }

    /// Waits until the entry reaches `wanted`; returns `false` if the cache
    /// entry went away first.
    pub async fn wait_for(&mut self, wanted: QueryStatus) -> bool {
        self.status.wait_for(|status| *status == wanted).await.is_ok()
    }
}

impl<V> Drop for Subscription<V> {
    fn drop(&mut self) {
        let mut entries = mutex_lock(&self.inner.entries, "unsubscribe");
        let Some(entry) = entries.get_mut(&self.key) else {
            return;
        };
        entry.observers = entry.observers.saturating_sub(1);
        // Unobserved entries holding nothing are dropped.
        if entry.observers == 0 && entry.status == QueryStatus::Absent && entry.in_flight.is_none() {
            entries.remove(&self.key);
        }
    }
}

impl<V> fmt::Debug for Subscription<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("status", &*self.status.borrow())
            .finish()
    }
}
